// ==========================================
// SAP 成本核算批处理 - 作业配置
// ==========================================
// 启动时构造一次，按引用传给各组件
// 来源: 进程环境变量（可由 .env 文件补充）
// 校验: 仅做存在性检查，值按不透明字符串处理
// ==========================================

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ===== 环境变量键 =====
pub const KEY_API_URL: &str = "API_URL";
pub const KEY_BAPI: &str = "BAPI";
pub const KEY_CUSTOMER_CODE: &str = "CUS_CODE_SOLD_FROM";
pub const KEY_INV_FROM_DATE: &str = "INV_DT_FROM_DATE";
pub const KEY_BUYER_ID: &str = "BUYER_ID";
pub const KEY_T_CODE_YB: &str = "T_CODE_YB";
pub const KEY_T_CODE_ZM: &str = "T_CODE_ZM";
pub const KEY_T_CODE_ME: &str = "T_CODE_ME";
pub const KEY_T_CODE_MM: &str = "T_CODE_MM";
pub const KEY_T_CODE_Z2: &str = "T_CODE_Z2";
pub const KEY_T_CODE_ZC: &str = "T_CODE_ZC";
pub const KEY_CAPTURE_DIR: &str = "CAPTURE_DIR";
pub const KEY_MATERIAL_LIST: &str = "MATERIAL_LIST";
pub const KEY_DB_PATH: &str = "SAP_COSTING_DB_PATH";
pub const KEY_REPORT_DIR: &str = "REPORT_DIR";
pub const KEY_LOCAL_CURRENCY: &str = "LOCAL_CURRENCY";
pub const KEY_PLANT_FILTER: &str = "PLANT_FILTER";
pub const KEY_MAX_RETRIES: &str = "MAX_RETRIES";
pub const KEY_RETRY_DELAY_MS: &str = "RETRY_DELAY_MS";
pub const KEY_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

// ===== 默认值 =====
pub const DEFAULT_BUYER_ID: &str = "BMW";
pub const DEFAULT_REPORT_DIR: &str = "./reports";
pub const DEFAULT_LOCAL_CURRENCY: &str = "INR";
pub const DEFAULT_PLANT_FILTER: &str = "1100,2650";
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// 旧版 .env 中的连字符写法
const LEGACY_ALIASES: [(&str, &str); 2] = [
    (KEY_CUSTOMER_CODE, "CUS_CODE-SOLD_FROM"),
    (KEY_INV_FROM_DATE, "INV_DT-FROM_DATE"),
];

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缺少配置项: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error(".env 文件加载失败: {0}")]
    EnvFile(String),

    #[error("配置表读取失败: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Database(err.to_string())
    }
}

/// RFC 桥接配置（对账作业必需）
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSettings {
    pub api_url: String,
    pub bapi: String,
    pub customer_code: String,
    pub from_date: String,
}

/// 屏幕抓取配置（成本作业必需）
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    pub capture_dir: PathBuf,
    pub t_code_yb: String,
    pub t_code_zm: String,
    pub t_code_me: String,
    pub t_code_mm: String,
    pub t_code_z2: String,
    pub t_code_zc: String,
}

// ==========================================
// JobConfig
// ==========================================
#[derive(Debug, Clone)]
pub struct JobConfig {
    // ===== RFC 桥接 =====
    pub api_url: Option<String>,
    pub bapi: Option<String>,
    pub customer_code: Option<String>,
    pub inv_from_date: Option<String>,
    pub buyer_id: String,

    // ===== 屏幕抓取 =====
    pub t_code_yb: Option<String>,
    pub t_code_zm: Option<String>,
    pub t_code_me: Option<String>,
    pub t_code_mm: Option<String>,
    pub t_code_z2: Option<String>,
    pub t_code_zc: Option<String>,
    pub capture_dir: Option<PathBuf>,
    pub material_list: Option<PathBuf>,

    // ===== 存储 / 输出 =====
    pub db_path: String,
    pub report_dir: PathBuf,

    // ===== 运行参数 =====
    pub local_currency: String,
    pub plant_filter: Vec<String>,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

/// 逗号分隔列表（去空白，丢弃空项）
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: "需要非负整数".to_string(),
    })
}

/// 默认数据库路径: 用户数据目录/sap-costing/sap_costing.db
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./sap_costing.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("sap-costing");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("sap_costing.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 加载 .env（未指定路径时查找当前目录及上级目录，文件不存在不报错）
pub fn load_env_file(path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(p) => dotenvy::from_path(p)
            .map(|_| ())
            .map_err(|e| ConfigError::EnvFile(format!("{}: {}", p.display(), e))),
        None => {
            dotenvy::dotenv().ok();
            Ok(())
        }
    }
}

impl JobConfig {
    /// 从进程环境变量构造
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构造（空白值视为未设置）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            let alias = LEGACY_ALIASES
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, a)| *a);
            lookup(key)
                .or_else(|| alias.and_then(&lookup))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let max_retries = match get(KEY_MAX_RETRIES) {
            Some(v) => parse_number(KEY_MAX_RETRIES, &v)?,
            None => DEFAULT_MAX_RETRIES,
        };
        let retry_delay_ms = match get(KEY_RETRY_DELAY_MS) {
            Some(v) => parse_number(KEY_RETRY_DELAY_MS, &v)?,
            None => DEFAULT_RETRY_DELAY_MS,
        };
        let timeout_secs = match get(KEY_REQUEST_TIMEOUT_SECS) {
            Some(v) => parse_number(KEY_REQUEST_TIMEOUT_SECS, &v)?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: get(KEY_API_URL),
            bapi: get(KEY_BAPI),
            customer_code: get(KEY_CUSTOMER_CODE),
            inv_from_date: get(KEY_INV_FROM_DATE),
            buyer_id: get(KEY_BUYER_ID).unwrap_or_else(|| DEFAULT_BUYER_ID.to_string()),
            t_code_yb: get(KEY_T_CODE_YB),
            t_code_zm: get(KEY_T_CODE_ZM),
            t_code_me: get(KEY_T_CODE_ME),
            t_code_mm: get(KEY_T_CODE_MM),
            t_code_z2: get(KEY_T_CODE_Z2),
            t_code_zc: get(KEY_T_CODE_ZC),
            capture_dir: get(KEY_CAPTURE_DIR).map(PathBuf::from),
            material_list: get(KEY_MATERIAL_LIST).map(PathBuf::from),
            db_path: get(KEY_DB_PATH).unwrap_or_else(default_db_path),
            report_dir: PathBuf::from(
                get(KEY_REPORT_DIR).unwrap_or_else(|| DEFAULT_REPORT_DIR.to_string()),
            ),
            local_currency: get(KEY_LOCAL_CURRENCY)
                .unwrap_or_else(|| DEFAULT_LOCAL_CURRENCY.to_string()),
            plant_filter: parse_list(
                &get(KEY_PLANT_FILTER).unwrap_or_else(|| DEFAULT_PLANT_FILTER.to_string()),
            ),
            max_retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// 对账作业所需的桥接配置（列出全部缺失项）
    pub fn bridge_settings(&self) -> Result<BridgeSettings, ConfigError> {
        let mut missing = Vec::new();
        let mut take = |key: &str, value: &Option<String>| -> String {
            value.clone().unwrap_or_else(|| {
                missing.push(key.to_string());
                String::new()
            })
        };

        let settings = BridgeSettings {
            api_url: take(KEY_API_URL, &self.api_url),
            bapi: take(KEY_BAPI, &self.bapi),
            customer_code: take(KEY_CUSTOMER_CODE, &self.customer_code),
            from_date: take(KEY_INV_FROM_DATE, &self.inv_from_date),
        };

        if missing.is_empty() {
            Ok(settings)
        } else {
            Err(ConfigError::MissingKeys(missing))
        }
    }

    /// 成本作业所需的抓取配置（列出全部缺失项，含物料清单）
    pub fn capture_settings(&self) -> Result<CaptureSettings, ConfigError> {
        let mut missing = Vec::new();
        let mut take = |key: &str, value: &Option<String>| -> String {
            value.clone().unwrap_or_else(|| {
                missing.push(key.to_string());
                String::new()
            })
        };

        let t_code_yb = take(KEY_T_CODE_YB, &self.t_code_yb);
        let t_code_zm = take(KEY_T_CODE_ZM, &self.t_code_zm);
        let t_code_me = take(KEY_T_CODE_ME, &self.t_code_me);
        let t_code_mm = take(KEY_T_CODE_MM, &self.t_code_mm);
        let t_code_z2 = take(KEY_T_CODE_Z2, &self.t_code_z2);
        let t_code_zc = take(KEY_T_CODE_ZC, &self.t_code_zc);

        if self.capture_dir.is_none() {
            missing.push(KEY_CAPTURE_DIR.to_string());
        }
        if self.material_list.is_none() {
            missing.push(KEY_MATERIAL_LIST.to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        Ok(CaptureSettings {
            capture_dir: self.capture_dir.clone().unwrap_or_default(),
            t_code_yb,
            t_code_zm,
            t_code_me,
            t_code_mm,
            t_code_z2,
            t_code_zc,
        })
    }

    /// 物料清单路径
    pub fn material_list_path(&self) -> Result<&Path, ConfigError> {
        self.material_list
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKeys(vec![KEY_MATERIAL_LIST.to_string()]))
    }
}
