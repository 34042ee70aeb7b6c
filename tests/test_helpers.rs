// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use rusqlite::{params, Connection};
use sap_costing::db::{ensure_schema, open_sqlite_connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（多个仓储共用）
pub fn shared_conn(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()))
}

/// 插入叫料订单
pub fn insert_order(
    conn: &Connection,
    id: i64,
    buyer_id: &str,
    year: i32,
    week_no: u32,
    article_no: &str,
    delivery_quantity: &str,
    creation_date: Option<&str>,
) {
    conn.execute(
        r#"
        INSERT INTO call_off_order
            (id, buyer_id, year, created_at_week_no, buyer_article_no, order_no,
             delivery_quantity, creation_date, delivery_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
        "#,
        params![
            id,
            buyer_id,
            year,
            week_no,
            article_no,
            format!("PO-{}", id),
            delivery_quantity,
            creation_date,
        ],
    )
    .unwrap();
}

/// 插入仓库库存（原始文本值）
pub fn insert_stock(conn: &Connection, article_no: &str, qty: &str) {
    conn.execute(
        "INSERT INTO warehouse_stock (buyer_article_no, warehouse_qty) VALUES (?1, ?2)",
        params![article_no, qty],
    )
    .unwrap();
}

/// 读取单条订单的计算字段（部分列）
#[derive(Debug, PartialEq)]
pub struct StoredComputed {
    pub warehouse_stock: Option<f64>,
    pub blg_warehouse_stock: Option<f64>,
    pub git_qty: Option<f64>,
    pub next_git_wh_qty: Option<f64>,
    pub next_git_wh_date: Option<String>,
    pub safety_stock_alarm: Option<i64>,
    pub short_fall_demand_qty: Option<i64>,
    pub tot_demand_qty_raise: Option<i64>,
    pub demand_dt_prod: Option<String>,
    pub dem_sea: Option<String>,
    pub dem_air: Option<String>,
    pub mat_pos: Option<String>,
}

pub fn read_computed(conn: &Connection, id: i64) -> StoredComputed {
    conn.query_row(
        r#"
        SELECT warehouse_stock, blg_warehouse_stock, git_qty, next_git_wh_qty,
               next_git_wh_date, safety_stock_alarm, short_fall_demand_qty,
               tot_demand_qty_raise, demand_dt_prod, dem_sea, dem_air, mat_pos
        FROM call_off_order WHERE id = ?1
        "#,
        params![id],
        |row| {
            Ok(StoredComputed {
                warehouse_stock: row.get(0)?,
                blg_warehouse_stock: row.get(1)?,
                git_qty: row.get(2)?,
                next_git_wh_qty: row.get(3)?,
                next_git_wh_date: row.get(4)?,
                safety_stock_alarm: row.get(5)?,
                short_fall_demand_qty: row.get(6)?,
                tot_demand_qty_raise: row.get(7)?,
                demand_dt_prod: row.get(8)?,
                dem_sea: row.get(9)?,
                dem_air: row.get(10)?,
                mat_pos: row.get(11)?,
            })
        },
    )
    .unwrap()
}
