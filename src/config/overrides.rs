// ==========================================
// SAP 成本核算批处理 - 配置覆写
// ==========================================
// 存储: config_kv 表 (scope_id = 'global')
// 可覆写: local_currency / plant_filter / max_retries
// 表不存在时不覆写
// ==========================================

use crate::config::job_config::{parse_list, ConfigError, JobConfig};
use crate::db::table_exists;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

pub const OVERRIDE_LOCAL_CURRENCY: &str = "local_currency";
pub const OVERRIDE_PLANT_FILTER: &str = "plant_filter";
pub const OVERRIDE_MAX_RETRIES: &str = "max_retries";

fn get_global_value(conn: &Connection, key: &str) -> Result<Option<String>, ConfigError> {
    Ok(conn
        .query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// 应用 config_kv 覆写，返回被覆写的项数
pub fn apply_overrides(conn: &Connection, config: &mut JobConfig) -> Result<usize, ConfigError> {
    if !table_exists(conn, "config_kv")? {
        return Ok(0);
    }

    let mut applied = 0;

    if let Some(currency) = get_global_value(conn, OVERRIDE_LOCAL_CURRENCY)? {
        config.local_currency = currency;
        applied += 1;
    }

    if let Some(filter) = get_global_value(conn, OVERRIDE_PLANT_FILTER)? {
        config.plant_filter = parse_list(&filter);
        applied += 1;
    }

    if let Some(retries) = get_global_value(conn, OVERRIDE_MAX_RETRIES)? {
        config.max_retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
            key: OVERRIDE_MAX_RETRIES.to_string(),
            value: retries.clone(),
            message: "需要非负整数".to_string(),
        })?;
        applied += 1;
    }

    if applied > 0 {
        info!(
            applied = applied,
            local_currency = %config.local_currency,
            plant_filter = ?config.plant_filter,
            max_retries = config.max_retries,
            "已应用 config_kv 覆写"
        );
    }
    Ok(applied)
}
