// ==========================================
// SAP 成本核算批处理 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod costing;
pub mod order;
pub mod price;
pub mod pullout;
pub mod run;
pub mod table;
pub mod types;

// 重导出核心类型
pub use costing::{CostBreakdown, CostRow, CostSheet, MaterialRow, GRAND_TOTAL_LABEL};
pub use order::{ComputedOrderFields, OrderRecord};
pub use price::{ExchangeRate, OrderHistoryLine, PriceQuote, SpotQuote};
pub use pullout::{PulloutRecord, WarehouseStock};
pub use run::{FailedRecord, PlantMaterial};
pub use table::RawTable;
pub use types::{CellValue, MaterialPosition, PriceSource};
