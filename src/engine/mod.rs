// ==========================================
// SAP 成本核算批处理 - 引擎层
// ==========================================
// 职责: 对账 / 单价选择 / 汇率选择 / 成本计算 + 作业编排
// 红线: 纯计算模块不做 I/O, 不拼 SQL
// ==========================================

pub mod costing;
pub mod costing_job;
pub mod exchange_rate;
pub mod price_selector;
pub mod reconcile_job;
pub mod reconciler;
pub mod retry;

// 重导出核心引擎
pub use costing::CostingEngine;
pub use costing_job::{CostingJob, CostingSummary};
pub use exchange_rate::{month_bounds, period_windows, previous_month_window, select_exchange_rate};
pub use price_selector::{select_spot_quote, select_unit_price, PriceCandidates};
pub use reconcile_job::{ReconcileJob, ReconcileParams, ReconcileSummary};
pub use reconciler::{classify_position, reconcile_order};
pub use retry::with_retry;
