// ==========================================
// SAP 成本核算批处理 - 导入层
// ==========================================
// 职责: 抓取表格 / 输入文件 → 领域记录
// 支持: Excel, CSV, HTML
// ==========================================

pub mod cost_breakdown;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod html_table;
pub mod material_list;
pub mod screen_tables;

// 重导出核心类型
pub use cost_breakdown::map_cost_breakdown;
pub use data_cleaner::{clean_numeric, clean_numeric_str, coerce_numeric, coerce_numeric_str};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use html_table::parse_html_table;
pub use material_list::read_material_list;
