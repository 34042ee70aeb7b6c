// ==========================================
// SAP 成本核算批处理 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少外部系统同时写入时的偶发 busy 错误
// - 缺表时按最小 schema 建表（已有表不改动）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys / busy_timeout 需要每个连接单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 判断表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
            [table],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false))
}

/// 建表（IF NOT EXISTS）
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS call_off_order (
            id INTEGER PRIMARY KEY,
            buyer_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            created_at_week_no INTEGER NOT NULL,
            buyer_article_no TEXT,
            order_no TEXT,
            delivery_quantity,
            creation_date TEXT,
            delivery_date TEXT,
            -- 对账计算字段
            warehouse_stock REAL,
            blg_warehouse_stock REAL,
            git_qty REAL,
            next_git_wh_qty REAL,
            next_git_wh_date TEXT,
            safety_stock_alarm INTEGER,
            short_fall_demand_qty INTEGER,
            tot_demand_qty_raise INTEGER,
            demand_dt_prod TEXT,
            dem_sea TEXT,
            dem_air TEXT,
            mat_pos TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_call_off_order_week
            ON call_off_order (buyer_id, year, created_at_week_no);

        CREATE TABLE IF NOT EXISTS warehouse_stock (
            buyer_article_no TEXT NOT NULL,
            warehouse_qty
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert!(!table_exists(&conn, "call_off_order").unwrap());

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert!(table_exists(&conn, "call_off_order").unwrap());
        assert!(table_exists(&conn, "warehouse_stock").unwrap());
        assert!(table_exists(&conn, "config_kv").unwrap());
    }
}
