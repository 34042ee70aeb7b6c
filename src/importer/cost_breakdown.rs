// ==========================================
// SAP 成本核算批处理 - 成本分解表列映射
// ==========================================
// 成本分解表按位置取列（表头文本不可靠）:
// - 第 1 列: 行标识（合计行写入 "Grand Total"）
// - 第 17 列: 原材料重量 RM-Weight
// - 第 18 列: 废料重量 Scrap1 wt
// - 第 20 列: 核对废料重量 Scrap3 wt（由成本引擎重算）
// 废料单价按表头 "Scrap Rate1" 定位
// ==========================================

use crate::domain::costing::MaterialRow;
use crate::domain::table::RawTable;
use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};

/// 最多读取的列数
pub const MAX_COLUMNS: usize = 27;
/// 映射所需的最少列数（需多于此值）
pub const MIN_COLUMNS_EXCLUSIVE: usize = 19;

pub const RM_WEIGHT_INDEX: usize = 16;
pub const SCRAP_WEIGHT_INDEX: usize = 17;
pub const SCRAP3_WEIGHT_INDEX: usize = 19;
pub const SCRAP_RATE_HEADER: &str = "Scrap Rate1";

/// 成本分解表表头行（0 起，前 9 行为屏幕抬头）
pub const COST_BREAKDOWN_HEADER_ROW: usize = 9;

fn to_cell(text: &str) -> CellValue {
    if text.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(text.to_string())
    }
}

/// 映射成本分解表为 MaterialRow 序列
///
/// # 返回
/// - (行标识列表头, 行序列)
/// - Err(ColumnCountError): 列数不多于 19
pub fn map_cost_breakdown(table: &RawTable) -> ImportResult<(String, Vec<MaterialRow>)> {
    let width = table.headers.len().min(MAX_COLUMNS);
    if width <= MIN_COLUMNS_EXCLUSIVE {
        return Err(ImportError::ColumnCountError {
            min: MIN_COLUMNS_EXCLUSIVE,
            actual: width,
        });
    }

    let label_header = table.headers[0].trim().to_string();
    let rate_idx = table.column_index(SCRAP_RATE_HEADER).filter(|idx| *idx < width);

    let rows = (0..table.rows.len())
        .map(|row| {
            let material_row = MaterialRow::new(
                table.cell(row, 0).trim(),
                to_cell(table.cell(row, RM_WEIGHT_INDEX)),
                to_cell(table.cell(row, SCRAP_WEIGHT_INDEX)),
            );
            match rate_idx {
                Some(idx) => material_row.with_scrap_rate(to_cell(table.cell(row, idx))),
                None => material_row,
            }
        })
        .collect();

    Ok((label_header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(width: usize) -> Vec<String> {
        (0..width)
            .map(|i| match i {
                0 => "Operation".to_string(),
                21 => SCRAP_RATE_HEADER.to_string(),
                _ => format!("Col{}", i + 1),
            })
            .collect()
    }

    fn row(label: &str, rm: &str, scrap: &str, rate: &str, width: usize) -> Vec<String> {
        let mut cells = vec![String::new(); width];
        cells[0] = label.to_string();
        cells[RM_WEIGHT_INDEX] = rm.to_string();
        cells[SCRAP_WEIGHT_INDEX] = scrap.to_string();
        cells[SCRAP3_WEIGHT_INDEX] = "999".to_string();
        if width > 21 {
            cells[21] = rate.to_string();
        }
        cells
    }

    #[test]
    fn test_positional_mapping() {
        let table = RawTable::new(
            headers(30),
            vec![
                row("Cutting", "", "5", "", 30),
                row("Forming", "200", "-3", "12.5", 30),
            ],
        );

        let (label_header, rows) = map_cost_breakdown(&table).unwrap();

        assert_eq!(label_header, "Operation");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Cutting");
        assert_eq!(rows[0].raw_material_weight, CellValue::Empty);
        assert_eq!(rows[0].scrap_weight, CellValue::from("5"));
        assert_eq!(rows[1].raw_material_weight, CellValue::from("200"));
        assert_eq!(rows[1].scrap_rate, CellValue::from("12.5"));
    }

    #[test]
    fn test_too_few_columns() {
        let table = RawTable::new(headers(19), vec![]);
        let result = map_cost_breakdown(&table);
        assert!(matches!(
            result,
            Err(ImportError::ColumnCountError { min: 19, actual: 19 })
        ));
    }

    #[test]
    fn test_scrap_rate_beyond_column_limit_ignored() {
        let mut hdr = headers(20);
        hdr.extend((20..28).map(|i| format!("Col{}", i + 1)));
        hdr[27] = SCRAP_RATE_HEADER.to_string();
        let table = RawTable::new(hdr, vec![row("Cutting", "10", "1", "", 20)]);

        let (_, rows) = map_cost_breakdown(&table).unwrap();
        assert_eq!(rows[0].scrap_rate, CellValue::Empty);
    }
}
