// ==========================================
// SAP 成本核算批处理 - 价格 / 汇率领域模型
// ==========================================

use crate::domain::types::PriceSource;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 生效单价（每个工厂 / 物料至多一条）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub plant: String,
    pub material: String,
    pub source: PriceSource,
    pub unit_price: f64,
}

/// 现货报价（条件表行或期间评估行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub price: Option<f64>,
}

/// 采购订单历史行（已清洗）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderHistoryLine {
    pub order_quantity: f64,
    pub net_order_value: f64,
}

/// 汇率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub rate_type: Option<String>,
    pub from_currency: String,
    pub to_currency: String,
    pub date: NaiveDate,
    pub rate: f64,
}
