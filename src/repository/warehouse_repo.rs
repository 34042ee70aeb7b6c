// ==========================================
// SAP 成本核算批处理 - 仓库库存仓储
// ==========================================
// 数据源 C: warehouse_stock 表（只读）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::pullout::WarehouseStock;
use crate::importer::data_cleaner::clean_numeric;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::order_repo::value_to_cell;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct WarehouseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WarehouseRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按物料号查询库存记录（取第一条，数值经清洗）
    ///
    /// # 返回
    /// - Ok(None): 无库存记录
    pub fn find_stock(&self, article_no: &str) -> RepositoryResult<Option<WarehouseStock>> {
        let conn = self.get_conn()?;
        let row: Option<(String, Value)> = conn
            .query_row(
                "SELECT buyer_article_no, warehouse_qty FROM warehouse_stock
                 WHERE buyer_article_no = ?1 LIMIT 1",
                params![article_no],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(row.map(|(article_no, qty)| WarehouseStock {
            article_no,
            quantity: clean_numeric(&value_to_cell(qty)),
        }))
    }

    /// 按物料号查询库存数量
    pub fn find_quantity(&self, article_no: &str) -> RepositoryResult<Option<f64>> {
        Ok(self.find_stock(article_no)?.map(|stock| stock.quantity))
    }
}
