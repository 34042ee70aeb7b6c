// ==========================================
// SAP 成本核算批处理 - 配置层
// ==========================================
// 职责: 作业配置构造（环境变量 / .env）+ config_kv 覆写
// ==========================================

pub mod job_config;
pub mod overrides;

pub use job_config::{
    load_env_file, BridgeSettings, CaptureSettings, ConfigError, JobConfig,
};
pub use overrides::apply_overrides;
