// ==========================================
// SAP 成本核算批处理 - 工厂 / 物料清单读取
// ==========================================
// 输入: 工作簿第二行为表头，列 Plant / SAP Material Code
// 输出: 过滤后的 PlantMaterial 列表（保持文件顺序）
// ==========================================

use crate::domain::run::PlantMaterial;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use std::path::Path;
use tracing::{debug, info};

pub const PLANT_COLUMN: &str = "Plant";
pub const MATERIAL_COLUMN: &str = "SAP Material Code";

/// 表头行（0 起，第二行）
pub const MATERIAL_LIST_HEADER_ROW: usize = 1;

/// 读取物料清单，仅保留 plant_filter 中的工厂
///
/// plant_filter 为空时不过滤
pub fn read_material_list(path: &Path, plant_filter: &[String]) -> ImportResult<Vec<PlantMaterial>> {
    let table = UniversalFileParser.parse_table(path, MATERIAL_LIST_HEADER_ROW)?;
    let indexes = table
        .require_columns(&[PLANT_COLUMN, MATERIAL_COLUMN])
        .map_err(ImportError::MissingColumns)?;
    let (plant_idx, material_idx) = (indexes[0], indexes[1]);

    let mut items = Vec::new();
    for row in 0..table.rows.len() {
        let plant = table.cell(row, plant_idx).trim();
        let material = table.cell(row, material_idx).trim();
        if material.is_empty() {
            debug!(row = row, "物料号为空，跳过");
            continue;
        }
        if !plant_filter.is_empty() && !plant_filter.iter().any(|p| p == plant) {
            continue;
        }
        items.push(PlantMaterial::new(plant, material));
    }

    info!(
        path = %path.display(),
        total = table.rows.len(),
        selected = items.len(),
        "物料清单读取完成"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_list(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_filters_plants_and_trims_codes() {
        let file = write_list(&[
            "US supplied codes,,",
            "Plant,SAP Material Code,Description",
            " 1100 , M-001 ,Bracket",
            "3000,M-002,Hinge",
            "2650,M-003,Clip",
            "1100,,Blank",
        ]);
        let filter = vec!["1100".to_string(), "2650".to_string()];

        let items = read_material_list(file.path(), &filter).unwrap();

        assert_eq!(
            items,
            vec![
                PlantMaterial::new("1100", "M-001"),
                PlantMaterial::new("2650", "M-003"),
            ]
        );
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        let file = write_list(&["title,", "Plant,SAP Material Code", "3000,M-002"]);
        let items = read_material_list(file.path(), &[]).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let file = write_list(&["title,", "Plant,Material", "1100,M-001"]);
        let result = read_material_list(file.path(), &[]);
        assert!(matches!(result, Err(ImportError::MissingColumns(cols)) if cols == vec![MATERIAL_COLUMN.to_string()]));
    }
}
