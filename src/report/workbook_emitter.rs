// ==========================================
// SAP 成本核算批处理 - 报表输出
// ==========================================
// 每个工厂一个工作簿: <report_dir>/<plant>_report.xlsx
// 每个物料一个 sheet: 表头 + 明细行 + 合计行 + 空白分隔行
// 工具: umya-spreadsheet
// ==========================================

use crate::domain::costing::{CostRow, CostSheet};
use crate::error::{JobError, JobResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use umya_spreadsheet::Worksheet;

/// sheet 名最大长度
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// 数值列（行标识列之后）
pub const VALUE_COLUMNS: [&str; 10] = [
    "RM-Weight",
    "Scrap1 wt",
    "Scrap3 wt",
    "Scrap Rate1",
    "scrap_cost_1",
    "gross_rm",
    "net_rm",
    "net_rm_usd",
    "price_us",
    "price_in",
];

fn row_values(row: &CostRow) -> [Option<f64>; 10] {
    [
        row.raw_material_weight,
        row.scrap_weight,
        row.scrap3_weight,
        row.scrap_rate,
        row.scrap_cost,
        row.gross_rm,
        row.net_rm,
        row.net_rm_usd,
        row.spot_price,
        row.price_in_local,
    ]
}

/// sheet 名比较不区分大小写
fn is_taken(name: &str, used: &HashSet<String>) -> bool {
    let lower = name.to_lowercase();
    used.iter().any(|u| u.to_lowercase() == lower)
}

/// 清洗 sheet 名：替换非法字符、截断、去重（不区分大小写）
pub fn sanitize_sheet_name(raw: &str, used: &HashSet<String>) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME_LEN).collect()
    };

    if !is_taken(&base, used) {
        return base;
    }
    let mut n = 2;
    loop {
        let suffix = format!("_{}", n);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        let candidate: String = base.chars().take(keep).chain(suffix.chars()).collect();
        if !is_taken(&candidate, used) {
            return candidate;
        }
        n += 1;
    }
}

// ==========================================
// WorkbookEmitter
// ==========================================
pub struct WorkbookEmitter {
    report_dir: PathBuf,
}

impl WorkbookEmitter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    pub fn workbook_path(&self, plant: &str) -> PathBuf {
        self.report_dir.join(format!("{}_report.xlsx", plant))
    }

    /// 输出单个工厂的工作簿（覆盖已有文件）
    #[instrument(skip(self, sheets), fields(sheets = sheets.len()))]
    pub fn emit_plant(&self, plant: &str, sheets: &[CostSheet]) -> JobResult<PathBuf> {
        std::fs::create_dir_all(&self.report_dir)?;

        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let mut used = HashSet::new();

        for sheet in sheets {
            let name = sanitize_sheet_name(&sheet.material, &used);
            let worksheet = book
                .new_sheet(name.as_str())
                .map_err(|e| JobError::Io(format!("创建 sheet {} 失败: {}", name, e)))?;
            write_sheet(worksheet, sheet);
            used.insert(name);
        }

        let path = self.workbook_path(plant);
        write_book(&book, &path)?;
        info!(path = %path.display(), sheets = sheets.len(), "报表输出完成");
        Ok(path)
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &CostSheet) {
    // 表头
    let label_header = if sheet.label_header.is_empty() {
        "Item"
    } else {
        sheet.label_header.as_str()
    };
    worksheet.get_cell_mut((1u32, 1u32)).set_value(label_header);
    for (i, header) in VALUE_COLUMNS.iter().enumerate() {
        worksheet.get_cell_mut((i as u32 + 2, 1u32)).set_value(*header);
    }

    // 明细行 + 合计行
    let mut row_no: u32 = 2;
    for row in sheet.all_rows() {
        worksheet.get_cell_mut((1u32, row_no)).set_value(row.label.as_str());
        for (i, value) in row_values(row).iter().enumerate() {
            if let Some(v) = value {
                worksheet.get_cell_mut((i as u32 + 2, row_no)).set_value_number(*v);
            }
        }
        row_no += 1;
    }

    // 空白分隔行
    for col in 1..=(VALUE_COLUMNS.len() as u32 + 1) {
        worksheet.get_cell_mut((col, row_no)).set_value("");
    }
}

fn write_book(book: &umya_spreadsheet::Spreadsheet, path: &Path) -> JobResult<()> {
    umya_spreadsheet::writer::xlsx::write(book, path)
        .map_err(|e| JobError::Io(format!("写入 {} 失败: {:?}", path.display(), e)))
}
