// ==========================================
// SAP 成本核算批处理 - 拉料对账作业
// ==========================================
// 流程:
// 1. 按买方 + 当前 ISO 年 / 周读取叫料订单（数据源 A）
// 2. 调用 RFC 桥接取拉料记录（数据源 B，认证失败终止运行）
// 3. 逐条订单查询仓库库存（数据源 C）并对账
// 4. 计算字段逐条回写
// ==========================================

use crate::domain::order::ComputedOrderFields;
use crate::engine::reconciler::reconcile_order;
use crate::error::JobResult;
use crate::importer::data_cleaner::format_yyyymmdd;
use crate::repository::{FailedUpdate, OrderRepository, WarehouseRepository};
use crate::sources::{PulloutQuery, PulloutSource};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// 对账作业参数
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileParams {
    pub buyer_id: String,
    pub customer_code: String,
    pub from_date: String, // YYYYMMDD
}

/// 对账作业结果
#[derive(Debug, Clone, Default)]
pub struct ReconcileSummary {
    pub run_id: String,
    pub year: i32,
    pub week_no: u32,
    pub orders: usize,
    pub pullouts: usize,
    pub updated: usize,
    pub failed: Vec<FailedUpdate>,
}

// ==========================================
// ReconcileJob - 拉料对账作业
// ==========================================
pub struct ReconcileJob {
    source: Arc<dyn PulloutSource>,
    orders: OrderRepository,
    warehouse: WarehouseRepository,
    params: ReconcileParams,
}

impl ReconcileJob {
    pub fn new(
        source: Arc<dyn PulloutSource>,
        orders: OrderRepository,
        warehouse: WarehouseRepository,
        params: ReconcileParams,
    ) -> Self {
        Self {
            source,
            orders,
            warehouse,
            params,
        }
    }

    /// 执行一次对账
    ///
    /// # 返回
    /// - Err(Auth): 桥接认证失败（致命）
    /// - Err(Persistence): 订单读取失败
    /// - 单条回写失败记入 summary.failed，不中断
    pub async fn run(&self, today: NaiveDate) -> JobResult<ReconcileSummary> {
        let run_id = Uuid::new_v4().to_string();
        let iso = today.iso_week();
        let (year, week_no) = (iso.year(), iso.week());

        info!(
            run_id = %run_id,
            buyer_id = %self.params.buyer_id,
            year = year,
            week_no = week_no,
            "开始拉料对账"
        );

        // ==========================================
        // 步骤1: 读取本周叫料订单
        // ==========================================
        let orders = self
            .orders
            .find_for_week(&self.params.buyer_id, year, week_no)?;

        // ==========================================
        // 步骤2: 拉取拉料记录
        // ==========================================
        let query = PulloutQuery {
            from_date: self.params.from_date.clone(),
            to_date: format_yyyymmdd(today),
            customer_code: self.params.customer_code.clone(),
        };
        let pullouts = match self.source.fetch_pullouts(&query).await {
            Ok(records) => records,
            Err(e) => {
                error!(run_id = %run_id, error = %e, "拉料记录获取失败，终止对账");
                return Err(e);
            }
        };

        info!(
            run_id = %run_id,
            orders = orders.len(),
            pullouts = pullouts.len(),
            "对账输入就绪"
        );

        // ==========================================
        // 步骤3: 逐条对账
        // ==========================================
        let mut updates: Vec<(i64, ComputedOrderFields)> = Vec::with_capacity(orders.len());
        let mut failed = Vec::new();

        for order in &orders {
            let warehouse_qty = match self.warehouse.find_quantity(&order.buyer_article_no) {
                Ok(qty) => qty.unwrap_or(0.0),
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        order_id = order.id,
                        article_no = %order.buyer_article_no,
                        error = %e,
                        "仓库库存查询失败，跳过该订单"
                    );
                    failed.push(FailedUpdate {
                        id: order.id,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            updates.push((order.id, reconcile_order(order, &pullouts, warehouse_qty, today)));
        }

        // ==========================================
        // 步骤4: 回写
        // ==========================================
        let report = self.orders.batch_update_computed(&updates);
        failed.extend(report.failed);

        let summary = ReconcileSummary {
            run_id,
            year,
            week_no,
            orders: orders.len(),
            pullouts: pullouts.len(),
            updated: report.updated,
            failed,
        };

        info!(
            run_id = %summary.run_id,
            orders = summary.orders,
            updated = summary.updated,
            failed = summary.failed.len(),
            "拉料对账完成"
        );
        Ok(summary)
    }
}
