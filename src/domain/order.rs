// ==========================================
// SAP 成本核算批处理 - 叫料订单领域模型
// ==========================================
// 用途: 数据源 A 读出，对账后回写计算字段
// 对齐: call_off_order 表
// ==========================================

use crate::domain::types::{CellValue, MaterialPosition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderRecord - 叫料 / 需求行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub buyer_article_no: String,          // 买方物料号（与 KDMAT 关联）
    pub order_no: Option<String>,          // 订单号
    pub delivery_quantity: CellValue,      // 交货数量（原始值，使用时清洗）
    pub creation_date: Option<NaiveDate>,  // 报文日期
    pub delivery_date: Option<NaiveDate>,  // 交货日期
}

impl OrderRecord {
    pub fn new(id: i64, buyer_article_no: impl Into<String>) -> Self {
        Self {
            id,
            buyer_article_no: buyer_article_no.into(),
            order_no: None,
            delivery_quantity: CellValue::Empty,
            creation_date: None,
            delivery_date: None,
        }
    }

    pub fn with_delivery_quantity(mut self, qty: impl Into<CellValue>) -> Self {
        self.delivery_quantity = qty.into();
        self
    }

    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }

    pub fn with_order_no(mut self, order_no: impl Into<String>) -> Self {
        self.order_no = Some(order_no.into());
        self
    }
}

// ==========================================
// ComputedOrderFields - 对账计算字段
// ==========================================
// 整体回写，重复运行覆盖同一组列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedOrderFields {
    // ===== 库存位置 =====
    pub warehouse_stock: f64,                 // 仓库库存
    pub blg_warehouse_stock: f64,             // 拉料余量 (bal_pull)
    pub git_qty: f64,                         // 在途未收货数量
    pub next_git_wh_qty: f64,                 // 下月在途数量
    pub next_git_wh_date: Option<NaiveDate>,  // 首条拉料记录的 ETA

    // ===== 需求数量（整数截断后计算）=====
    pub safety_stock_alarm: i64,
    pub short_fall_demand_qty: i64,
    pub tot_demand_qty_raise: i64,

    // ===== 需求里程碑日期 =====
    pub demand_dt_prod: Option<NaiveDate>, // 报文日期 - 100 天
    pub dem_sea: Option<NaiveDate>,        // 报文日期 - 70 天
    pub dem_air: Option<NaiveDate>,        // 报文日期 - 25 天

    pub mat_pos: MaterialPosition,
}
