// ==========================================
// SAP 成本核算批处理 - 数据源层
// ==========================================
// 职责: 外部数据源接口 + 适配器
// - PulloutSource: 拉料 / 预测记录（RFC 桥接）
// - ScreenSource: SAP 屏幕抓取表格
// 红线: 数据源只返回原始记录 / 表格，不做计算
// ==========================================

pub mod capture_dir;
pub mod rest_bridge;

use crate::domain::pullout::PulloutRecord;
use crate::domain::run::PlantMaterial;
use crate::domain::table::RawTable;
use crate::error::JobResult;
use async_trait::async_trait;
use chrono::NaiveDate;

pub use capture_dir::CaptureDirSource;
pub use rest_bridge::RestBridgeClient;

/// 拉料记录查询参数
#[derive(Debug, Clone, PartialEq)]
pub struct PulloutQuery {
    pub from_date: String, // YYYYMMDD
    pub to_date: String,   // YYYYMMDD
    pub customer_code: String,
}

// ==========================================
// PulloutSource Trait
// ==========================================
// 实现者: RestBridgeClient
#[async_trait]
pub trait PulloutSource: Send + Sync {
    /// 查询日期范围内的拉料记录
    ///
    /// # 错误
    /// - Auth: 令牌 / 登录失败（致命）
    /// - Io: 网络失败
    /// - DataShape: 返回体无法解析
    async fn fetch_pullouts(&self, query: &PulloutQuery) -> JobResult<Vec<PulloutRecord>>;
}

// ==========================================
// ScreenSource Trait
// ==========================================
// 实现者: CaptureDirSource
// 每个方法对应一个 SAP 事务码屏幕
#[async_trait]
pub trait ScreenSource: Send + Sync {
    /// 成本分解表（按位置取列）
    async fn cost_breakdown(&self, item: &PlantMaterial) -> JobResult<RawTable>;

    /// 条件价格表（现货报价）
    async fn spot_conditions(&self, item: &PlantMaterial) -> JobResult<RawTable>;

    /// 期间评估表（查询窗口 [from, to]）
    async fn period_valuation(
        &self,
        item: &PlantMaterial,
        from: NaiveDate,
        to: NaiveDate,
    ) -> JobResult<RawTable>;

    /// 采购订单历史
    async fn order_history(&self, item: &PlantMaterial) -> JobResult<RawTable>;

    /// 库存评估均价（单字段文本）
    async fn inventory_valuation(&self, item: &PlantMaterial) -> JobResult<Option<String>>;

    /// 汇率表（查询窗口 [from, to]）
    async fn exchange_rates(&self, from: NaiveDate, to: NaiveDate) -> JobResult<RawTable>;
}
