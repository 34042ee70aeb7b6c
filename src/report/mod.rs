// ==========================================
// SAP 成本核算批处理 - 报表层
// ==========================================

pub mod workbook_emitter;

pub use workbook_emitter::{sanitize_sheet_name, WorkbookEmitter};
