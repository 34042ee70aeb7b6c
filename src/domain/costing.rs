// ==========================================
// SAP 成本核算批处理 - 成本明细领域模型
// ==========================================
// 用途: 成本分解抓取行 → 成本引擎 → 报表
// ==========================================

use crate::domain::price::PriceQuote;
use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};

/// 合计行标签
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

// ==========================================
// MaterialRow - 成本分解抓取行（未清洗）
// ==========================================
// 行顺序有意义：按工序正序排列
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialRow {
    pub label: String,                // 标识列（首列）
    pub raw_material_weight: CellValue,
    pub scrap_weight: CellValue,
    pub scrap_rate: CellValue,
}

impl MaterialRow {
    pub fn new(
        label: impl Into<String>,
        raw_material_weight: impl Into<CellValue>,
        scrap_weight: impl Into<CellValue>,
    ) -> Self {
        Self {
            label: label.into(),
            raw_material_weight: raw_material_weight.into(),
            scrap_weight: scrap_weight.into(),
            scrap_rate: CellValue::Empty,
        }
    }

    pub fn with_scrap_rate(mut self, rate: impl Into<CellValue>) -> Self {
        self.scrap_rate = rate.into();
        self
    }
}

// ==========================================
// CostRow - 计算后的成本行
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub label: String,
    pub raw_material_weight: Option<f64>,
    pub scrap_weight: Option<f64>,
    pub scrap3_weight: Option<f64>,  // 逆序扣减后的核对重量
    pub scrap_rate: Option<f64>,
    pub scrap_cost: Option<f64>,
    pub gross_rm: Option<f64>,       // 毛原材料成本（仅末行）
    pub net_rm: Option<f64>,         // 净原材料成本（逆序累计）
    pub net_rm_usd: Option<f64>,     // 仅合计行
    pub spot_price: Option<f64>,     // 仅合计行
    pub price_in_local: Option<f64>, // 仅合计行
}

/// 成本引擎输出：明细行 + 合计行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub rows: Vec<CostRow>,
    pub grand_total: CostRow,
}

/// 单个工厂 / 物料的成本表（报表一个 sheet）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSheet {
    pub plant: String,
    pub material: String,
    pub label_header: String,
    pub unit_price: PriceQuote,
    pub breakdown: CostBreakdown,
}

impl CostSheet {
    /// 明细行 + 合计行（合计行在最后）
    pub fn all_rows(&self) -> impl Iterator<Item = &CostRow> {
        self.breakdown
            .rows
            .iter()
            .chain(std::iter::once(&self.breakdown.grand_total))
    }
}
