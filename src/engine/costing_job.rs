// ==========================================
// SAP 成本核算批处理 - 成本核算作业
// ==========================================
// 流程:
// 1. 汇率（上月窗口，USD → 本币）只取一次，失败按缺失处理
// 2. 逐个工厂 / 物料顺序处理:
//    成本分解 → 单价候选（现货 / 期间 / 订单历史 / 库存评估）
//    → 单价选择 → 成本计算
// 3. 按工厂输出工作簿
// 4. 运行结束统一输出失败清单
// 错误: Auth 终止运行；其他错误记入失败清单，跳过当前物料
// ==========================================

use crate::config::JobConfig;
use crate::domain::costing::CostSheet;
use crate::domain::price::SpotQuote;
use crate::domain::run::{FailedRecord, PlantMaterial};
use crate::engine::costing::CostingEngine;
use crate::engine::exchange_rate::{period_windows, previous_month_window, select_exchange_rate};
use crate::engine::price_selector::{
    order_history_average, select_unit_price, spot_price, PriceCandidates,
};
use crate::engine::retry::with_retry;
use crate::error::{JobError, JobResult};
use crate::importer::cost_breakdown::map_cost_breakdown;
use crate::importer::screen_tables::{
    parse_exchange_rates, parse_inventory_valuation, parse_order_history, parse_period_valuation,
    parse_spot_quotes,
};
use crate::report::WorkbookEmitter;
use crate::sources::ScreenSource;
use chrono::NaiveDate;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 汇率源币种
pub const BASE_CURRENCY: &str = "USD";

/// 成本核算作业结果
#[derive(Debug, Clone, Default)]
pub struct CostingSummary {
    pub run_id: String,
    pub processed: usize,
    pub exchange_rate: Option<f64>,
    pub workbooks: Vec<PathBuf>,
    pub failed: Vec<FailedRecord>,
}

// ==========================================
// CostingJob - 成本核算作业
// ==========================================
pub struct CostingJob {
    source: Arc<dyn ScreenSource>,
    engine: CostingEngine,
    emitter: WorkbookEmitter,
    local_currency: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl CostingJob {
    pub fn new(source: Arc<dyn ScreenSource>, config: &JobConfig) -> Self {
        Self {
            source,
            engine: CostingEngine::new(),
            emitter: WorkbookEmitter::new(config.report_dir.clone()),
            local_currency: config.local_currency.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        }
    }

    /// 抓取屏幕，可重试错误耗尽后按缺失处理；Auth 向上传播
    async fn fetch_optional<T, F, Fut>(
        &self,
        item: Option<&PlantMaterial>,
        screen: &str,
        op: F,
    ) -> JobResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = JobResult<T>>,
    {
        match with_retry(self.max_retries, self.retry_delay, screen, op).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let label = item.map(ToString::to_string).unwrap_or_default();
                warn!(
                    item = %label,
                    screen = screen,
                    error = %e,
                    "屏幕数据不可用，按缺失处理"
                );
                Ok(None)
            }
        }
    }

    /// 上月 USD → 本币汇率（失败返回 None）
    pub async fn fetch_exchange_rate(&self, today: NaiveDate) -> JobResult<Option<f64>> {
        let Some((from, to)) = previous_month_window(today) else {
            return Ok(None);
        };

        let table = self
            .fetch_optional(None, "exchange_rates", || self.source.exchange_rates(from, to))
            .await?;
        let Some(table) = table else {
            return Ok(None);
        };

        let rates = match parse_exchange_rates(&table) {
            Ok(rates) => rates,
            Err(e) => {
                warn!(error = %e, "汇率表格式异常，按缺失处理");
                return Ok(None);
            }
        };

        let rate = select_exchange_rate(&rates, BASE_CURRENCY, &self.local_currency)
            .map(|r| r.rate)
            .filter(|r| r.is_finite() && *r != 0.0);

        match rate {
            Some(r) => info!(
                from = %from,
                to = %to,
                currency = %self.local_currency,
                rate = r,
                "汇率已选定"
            ),
            None => warn!(
                from = %from,
                to = %to,
                currency = %self.local_currency,
                "无匹配汇率，美元列将为空"
            ),
        }
        Ok(rate)
    }

    /// 收集单价候选
    async fn price_candidates(
        &self,
        item: &PlantMaterial,
        today: NaiveDate,
    ) -> JobResult<PriceCandidates> {
        // 现货：条件表 + 各期间评估窗口
        let mut quotes: Vec<SpotQuote> = Vec::new();
        if let Some(table) = self
            .fetch_optional(Some(item), "spot_conditions", || {
                self.source.spot_conditions(item)
            })
            .await?
        {
            match parse_spot_quotes(&table) {
                Ok(mut q) => quotes.append(&mut q),
                Err(e) => debug!(item = %item, error = %e, "条件价格表不可用"),
            }
        }
        for (from, to) in period_windows(today) {
            if let Some(table) = self
                .fetch_optional(Some(item), "period_valuation", || {
                    self.source.period_valuation(item, from, to)
                })
                .await?
            {
                match parse_period_valuation(&table, from, to) {
                    Ok(mut q) => quotes.append(&mut q),
                    Err(e) => debug!(item = %item, from = %from, to = %to, error = %e, "期间评估表不可用"),
                }
            }
        }

        // 采购订单历史
        let order_average = self
            .fetch_optional(Some(item), "order_history", || self.source.order_history(item))
            .await?
            .and_then(|table| match parse_order_history(&table) {
                Ok(lines) => order_history_average(&lines),
                Err(e) => {
                    debug!(item = %item, error = %e, "订单历史不可用");
                    None
                }
            });

        // 库存评估
        let inventory_average = self
            .fetch_optional(Some(item), "inventory_valuation", || {
                self.source.inventory_valuation(item)
            })
            .await?
            .flatten()
            .and_then(|text| parse_inventory_valuation(&text));

        Ok(PriceCandidates {
            spot: spot_price(&quotes),
            order_average,
            inventory_average,
        })
    }

    /// 处理单个工厂 / 物料
    ///
    /// # 返回
    /// - Err(DataShape): 成本分解表不可用，或无可用单价
    /// - Err(Io): 成本分解抓取重试耗尽
    /// - Err(Auth): 认证失败
    pub async fn cost_item(
        &self,
        item: &PlantMaterial,
        exchange_rate: Option<f64>,
        today: NaiveDate,
    ) -> JobResult<CostSheet> {
        let table = with_retry(self.max_retries, self.retry_delay, "cost_breakdown", || {
            self.source.cost_breakdown(item)
        })
        .await?;
        let (label_header, rows) = map_cost_breakdown(&table)?;

        let candidates = self.price_candidates(item, today).await?;
        let quote = select_unit_price(&item.plant, &item.material, &candidates)
            .ok_or_else(|| JobError::DataShape("无可用单价（现货 / 订单历史 / 库存评估均为空）".to_string()))?;

        debug!(
            item = %item,
            source = ?quote.source,
            unit_price = quote.unit_price,
            "单价已选定"
        );

        let breakdown = self
            .engine
            .compute(&rows, quote.unit_price, exchange_rate, candidates.spot)?;

        Ok(CostSheet {
            plant: item.plant.clone(),
            material: item.material.clone(),
            label_header,
            unit_price: quote,
            breakdown,
        })
    }

    /// 执行一次成本核算
    pub async fn run(&self, items: &[PlantMaterial], today: NaiveDate) -> JobResult<CostingSummary> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, items = items.len(), "开始成本核算");

        let exchange_rate = self.fetch_exchange_rate(today).await?;

        // 工厂 → 成本表（保持首次出现顺序）
        let mut by_plant: Vec<(String, Vec<CostSheet>)> = Vec::new();
        let mut failed = Vec::new();
        let mut processed = 0;

        for item in items {
            match self.cost_item(item, exchange_rate, today).await {
                Ok(sheet) => {
                    processed += 1;
                    match by_plant.iter().position(|(plant, _)| *plant == item.plant) {
                        Some(idx) => by_plant[idx].1.push(sheet),
                        None => by_plant.push((item.plant.clone(), vec![sheet])),
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(run_id = %run_id, item = %item, error = %e, "认证失败，终止成本核算");
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        plant = %item.plant,
                        material = %item.material,
                        error = %e,
                        "物料处理失败，跳过"
                    );
                    failed.push(FailedRecord::new(item, e.to_string()));
                }
            }
        }

        let mut workbooks = Vec::new();
        for (plant, sheets) in &by_plant {
            match self.emitter.emit_plant(plant, sheets) {
                Ok(path) => workbooks.push(path),
                Err(e) => {
                    warn!(run_id = %run_id, plant = %plant, error = %e, "工作簿输出失败");
                    failed.extend(sheets.iter().map(|s| FailedRecord {
                        plant: s.plant.clone(),
                        material: s.material.clone(),
                        reason: e.to_string(),
                    }));
                }
            }
        }

        for record in &failed {
            warn!(
                run_id = %run_id,
                plant = %record.plant,
                material = %record.material,
                reason = %record.reason,
                "失败清单"
            );
        }

        info!(
            run_id = %run_id,
            processed = processed,
            failed = failed.len(),
            workbooks = workbooks.len(),
            "成本核算完成"
        );

        Ok(CostingSummary {
            run_id,
            processed,
            exchange_rate,
            workbooks,
            failed,
        })
    }
}
