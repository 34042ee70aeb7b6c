// ==========================================
// SAP 成本核算批处理 - 数据仓储层
// ==========================================
// 职责: 数据访问,不含业务逻辑
// 红线: Repository 不含引擎逻辑
// ==========================================

pub mod error;
pub mod order_repo;
pub mod warehouse_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use order_repo::{BatchUpdateReport, FailedUpdate, OrderRepository};
pub use warehouse_repo::WarehouseRepository;
