// ==========================================
// SAP 成本核算批处理 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 抓取表格 / RFC 返回 / 数据库列的原始值，未清洗
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ==========================================
// 物料位置 (Material Position)
// ==========================================
// 由 (bal_pull, git_qty, next_git_qty) 的零/非零组合判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialPosition {
    SufficientStock, // 仓库库存足以覆盖叫料
    GitAlert,        // 在途物料未按时报告
    PlanDispatch,    // 无库存，需安排发运
    Unknown,
}

impl MaterialPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialPosition::SufficientStock => {
                "Sufficient stock available in warehouse against call-off"
            }
            MaterialPosition::GitAlert => {
                "Alert on GIT material - Not reported on time against call-off"
            }
            MaterialPosition::PlanDispatch => "Stock not available - Plan for dispatch",
            MaterialPosition::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MaterialPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 价格来源 (Price Source)
// ==========================================
// 声明顺序即优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Spot,         // 现货 / 期间平均价
    OrderAvg,     // 采购订单历史均价
    InventoryAvg, // 库存评估均价
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Spot => write!(f, "spot"),
            PriceSource::OrderAvg => write!(f, "order_avg"),
            PriceSource::InventoryAvg => write!(f, "inventory_avg"),
        }
    }
}
