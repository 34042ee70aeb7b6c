// ==========================================
// SAP 成本核算批处理 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: RawTable（表头行可配置，表头之前的行丢弃）
// ==========================================

use crate::domain::table::RawTable;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// 文件解析接口
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - header_row: 表头所在行（0 起）
    fn parse_table(&self, file_path: &Path, header_row: usize) -> ImportResult<RawTable>;
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// 行拆分为表头 + 数据行，跳过完全空白的数据行
fn split_header(mut rows: Vec<Vec<String>>, header_row: usize) -> ImportResult<RawTable> {
    if rows.len() <= header_row {
        return Err(ImportError::EmptyTable(format!(
            "表头行 {} 不存在（共 {} 行）",
            header_row + 1,
            rows.len()
        )));
    }
    let data = rows.split_off(header_row + 1);
    let headers = rows.pop().unwrap_or_default();
    let data = data
        .into_iter()
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .collect();
    Ok(RawTable::new(headers, data))
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path, header_row: usize) -> ImportResult<RawTable> {
        check_exists(file_path)?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        split_header(rows, header_row)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path, header_row: usize) -> ImportResult<RawTable> {
        check_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let rows = range
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect()
            })
            .collect();

        split_header(rows, header_row)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path, header_row: usize) -> ImportResult<RawTable> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_table(file_path, header_row),
            "xlsx" | "xls" => ExcelParser.parse_table(file_path, header_row),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
