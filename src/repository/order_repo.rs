// ==========================================
// SAP 成本核算批处理 - 叫料订单仓储
// ==========================================
// 数据源 A: call_off_order 表
// 读: 按买方 / 年 / 周查询
// 写: 计算字段逐条 UPDATE（每条独立原子，跨记录无事务）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::{ComputedOrderFields, OrderRecord};
use crate::domain::types::CellValue;
use crate::importer::data_cleaner::parse_iso_date;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 单条回写失败记录
#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpdate {
    pub id: i64,
    pub reason: String,
}

/// 批量回写结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdateReport {
    pub updated: usize,
    pub failed: Vec<FailedUpdate>,
}

/// SQLite 动态列值 → 单元格值（未清洗）
pub(crate) fn value_to_cell(value: Value) -> CellValue {
    match value {
        Value::Integer(i) => CellValue::Number(i as f64),
        Value::Real(f) => CellValue::Number(f),
        Value::Text(s) => CellValue::Text(s),
        Value::Null | Value::Blob(_) => CellValue::Empty,
    }
}

fn format_date(date: Option<chrono::NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

// ==========================================
// OrderRepository - 叫料订单仓储
// ==========================================
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 创建新的 OrderRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按买方 / 年 / 周查询叫料订单
    ///
    /// 日期列无法解析时记为 None
    pub fn find_for_week(
        &self,
        buyer_id: &str,
        year: i32,
        week_no: u32,
    ) -> RepositoryResult<Vec<OrderRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, buyer_article_no, order_no, delivery_quantity,
                   creation_date, delivery_date
            FROM call_off_order
            WHERE buyer_id = ?1 AND year = ?2 AND created_at_week_no = ?3
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![buyer_id, year, week_no], |row| {
            let creation_date: Option<String> = row.get(4)?;
            let delivery_date: Option<String> = row.get(5)?;
            Ok(OrderRecord {
                id: row.get(0)?,
                buyer_article_no: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                order_no: row.get(2)?,
                delivery_quantity: value_to_cell(row.get::<_, Value>(3)?),
                creation_date: creation_date.as_deref().and_then(parse_iso_date),
                delivery_date: delivery_date.as_deref().and_then(parse_iso_date),
            })
        })?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?);
        }
        Ok(orders)
    }

    /// 回写单条记录的计算字段
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update_computed(&self, id: i64, fields: &ComputedOrderFields) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE call_off_order SET
                warehouse_stock = ?1,
                blg_warehouse_stock = ?2,
                git_qty = ?3,
                next_git_wh_qty = ?4,
                next_git_wh_date = ?5,
                safety_stock_alarm = ?6,
                short_fall_demand_qty = ?7,
                tot_demand_qty_raise = ?8,
                demand_dt_prod = ?9,
                dem_sea = ?10,
                dem_air = ?11,
                mat_pos = ?12
            WHERE id = ?13
            "#,
            params![
                fields.warehouse_stock,
                fields.blg_warehouse_stock,
                fields.git_qty,
                fields.next_git_wh_qty,
                format_date(fields.next_git_wh_date),
                fields.safety_stock_alarm,
                fields.short_fall_demand_qty,
                fields.tot_demand_qty_raise,
                format_date(fields.demand_dt_prod),
                format_date(fields.dem_sea),
                format_date(fields.dem_air),
                fields.mat_pos.as_str(),
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "call_off_order".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 批量回写计算字段
    ///
    /// 逐条更新，单条失败记录后继续，不回滚、不重试；
    /// 重复执行覆盖同一组列
    pub fn batch_update_computed(&self, updates: &[(i64, ComputedOrderFields)]) -> BatchUpdateReport {
        let mut report = BatchUpdateReport::default();
        for (id, fields) in updates {
            match self.update_computed(*id, fields) {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(order_id = id, error = %e, "叫料订单回写失败，跳过");
                    report.failed.push(FailedUpdate {
                        id: *id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        info!(
            updated = report.updated,
            failed = report.failed.len(),
            "叫料订单批量回写完成"
        );
        report
    }
}
