// ==========================================
// SAP 成本核算批处理 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + reqwest + calamine / umya-spreadsheet
// 作业: 拉料对账（回写叫料订单）/ 原材料成本核算（输出工作簿）
// 运行方式: 无人值守批处理，单线程顺序执行
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则 + 作业编排
pub mod engine;

// 导入层 - 抓取表格 / 输入文件
pub mod importer;

// 数据源层 - RFC 桥接 / 屏幕抓取
pub mod sources;

// 报表层 - 工作簿输出
pub mod report;

// 配置层 - 作业配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 作业错误类型
pub mod error;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::JobConfig;
pub use domain::{
    CostSheet, FailedRecord, MaterialPosition, OrderRecord, PlantMaterial, PriceSource,
    PulloutRecord,
};
pub use engine::{CostingEngine, CostingJob, ReconcileJob};
pub use error::{JobError, JobResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SAP 成本核算批处理";
