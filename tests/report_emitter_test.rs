// ==========================================
// 报表输出集成测试
// ==========================================
// 测试目标: 工作簿 / sheet 结构，读回校验（calamine）
// ==========================================

use calamine::{open_workbook_auto, Data, Reader};
use sap_costing::domain::{CostSheet, MaterialRow, PriceQuote, PriceSource};
use sap_costing::engine::CostingEngine;
use sap_costing::report::workbook_emitter::VALUE_COLUMNS;
use sap_costing::report::WorkbookEmitter;
use tempfile::TempDir;

fn sheet(plant: &str, material: &str) -> CostSheet {
    let rows = vec![
        MaterialRow::new("Cutting", 120.0, 4.0).with_scrap_rate(1.5),
        MaterialRow::new("Welding", 100.0, 2.0),
    ];
    let breakdown = CostingEngine::new()
        .compute(&rows, 3.0, Some(78.0), Some(2.0))
        .unwrap();
    CostSheet {
        plant: plant.to_string(),
        material: material.to_string(),
        label_header: "Operation".to_string(),
        unit_price: PriceQuote {
            plant: plant.to_string(),
            material: material.to_string(),
            source: PriceSource::Spot,
            unit_price: 3.0,
        },
        breakdown,
    }
}

#[test]
fn test_one_workbook_per_plant_one_sheet_per_material() {
    let tmp = TempDir::new().unwrap();
    let emitter = WorkbookEmitter::new(tmp.path().join("reports"));

    let sheets = vec![
        sheet("1100", "M-001"),
        sheet("1100", "M/01:X"),
        sheet("1100", "M-001"),
    ];
    let path = emitter.emit_plant("1100", &sheets).unwrap();
    assert_eq!(path, tmp.path().join("reports").join("1100_report.xlsx"));

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["M-001".to_string(), "M_01_X".to_string(), "M-001_2".to_string()]
    );

    let range = workbook.worksheet_range("M-001").unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();

    // 表头
    assert_eq!(rows[0][0].to_string(), "Operation");
    for (i, name) in VALUE_COLUMNS.iter().enumerate() {
        assert_eq!(rows[0][i + 1].to_string(), *name);
    }

    // 明细行顺序 + 合计行
    assert_eq!(rows[1][0].to_string(), "Cutting");
    assert_eq!(rows[2][0].to_string(), "Welding");
    assert_eq!(rows[3][0].to_string(), "Grand Total");

    // 合计行: 毛成本 3 × 120 = 360，净成本 360 - 3 - 6 = 351
    assert_eq!(rows[3][6], Data::Float(360.0));
    assert_eq!(rows[3][7], Data::Float(351.0));
    assert_eq!(rows[3][8], Data::Float(4.5));
    assert_eq!(rows[3][10], Data::Float(2.25));

    // 合计行之后只有空白分隔行
    assert!(rows[4..]
        .iter()
        .all(|r| r.iter().all(|c| c.to_string().is_empty())));
}

#[test]
fn test_emit_overwrites_existing_workbook() {
    let tmp = TempDir::new().unwrap();
    let emitter = WorkbookEmitter::new(tmp.path());

    emitter
        .emit_plant("2650", &[sheet("2650", "A"), sheet("2650", "B")])
        .unwrap();
    let path = emitter.emit_plant("2650", &[sheet("2650", "C")]).unwrap();

    let workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["C".to_string()]);
}
