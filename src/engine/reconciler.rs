// ==========================================
// SAP 成本核算批处理 - 拉料 / 库存对账引擎
// ==========================================
// 输入: 叫料订单 + 拉料记录 + 仓库库存
// 输出: ComputedOrderFields（整体回写）
// 红线: 数量按物料号精确匹配，取第一条匹配记录
// ==========================================

use crate::domain::order::{ComputedOrderFields, OrderRecord};
use crate::domain::pullout::PulloutRecord;
use crate::domain::types::MaterialPosition;
use crate::importer::data_cleaner::{clean_numeric, parse_iso_date};
use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, instrument};

/// “下月”判定的前推天数
pub const NEXT_MONTH_OFFSET_DAYS: i64 = 30;

pub const DEMAND_PROD_LEAD_DAYS: i64 = 100;
pub const DEMAND_SEA_LEAD_DAYS: i64 = 70;
pub const DEMAND_AIR_LEAD_DAYS: i64 = 25;

/// 物料位置判定（按顺序，首条命中）
pub fn classify_position(bal_pull: f64, git_qty: f64, next_git_qty: f64) -> MaterialPosition {
    match (bal_pull != 0.0, git_qty != 0.0, next_git_qty != 0.0) {
        (true, false, false) => MaterialPosition::SufficientStock,
        (false, true, true) => MaterialPosition::GitAlert,
        (false, false, false) => MaterialPosition::PlanDispatch,
        _ => MaterialPosition::Unknown,
    }
}

/// 是否落在 today + 30 天所在的自然月
pub fn in_next_month_window(date: NaiveDate, today: NaiveDate) -> bool {
    let target = today + Duration::days(NEXT_MONTH_OFFSET_DAYS);
    date.year() == target.year() && date.month() == target.month()
}

/// 需求里程碑日期（生产 / 海运 / 空运）
pub fn demand_milestones(
    creation_date: Option<NaiveDate>,
) -> (Option<NaiveDate>, Option<NaiveDate>, Option<NaiveDate>) {
    match creation_date {
        Some(date) => (
            Some(date - Duration::days(DEMAND_PROD_LEAD_DAYS)),
            Some(date - Duration::days(DEMAND_SEA_LEAD_DAYS)),
            Some(date - Duration::days(DEMAND_AIR_LEAD_DAYS)),
        ),
        None => (None, None, None),
    }
}

/// 单条叫料订单对账
#[instrument(skip(order, pullouts), fields(order_id = order.id, article_no = %order.buyer_article_no))]
pub fn reconcile_order(
    order: &OrderRecord,
    pullouts: &[PulloutRecord],
    warehouse_qty: f64,
    today: NaiveDate,
) -> ComputedOrderFields {
    let matching: Vec<&PulloutRecord> = pullouts
        .iter()
        .filter(|p| p.article_no == order.buyer_article_no)
        .collect();

    // 拉料余量：首条匹配
    let bal_pull = matching
        .first()
        .map(|p| clean_numeric(&p.balance_qty))
        .unwrap_or(0.0);

    // 在途：未收货且未开票数量为 0
    let git_qty = matching
        .iter()
        .find(|p| !p.is_received() && clean_numeric(&p.open_qty) == 0.0)
        .map(|p| clean_numeric(&p.pull_qty))
        .unwrap_or(0.0);

    // 下月在途：发运日期落在下月窗口，日期无法解析的行跳过
    let next_git_qty = matching
        .iter()
        .find(|p| {
            p.ship_date
                .as_deref()
                .and_then(parse_iso_date)
                .map(|d| in_next_month_window(d, today))
                .unwrap_or(false)
        })
        .map(|p| clean_numeric(&p.pull_qty))
        .unwrap_or(0.0);

    // ETA：首条匹配记录，与下月窗口无关
    let next_git_wh_date = matching
        .first()
        .and_then(|p| p.eta.as_deref())
        .and_then(parse_iso_date);

    // 整数截断后再组合
    let safety_stock_alarm = warehouse_qty as i64 - bal_pull as i64 + git_qty as i64;
    let short_fall_demand_qty = clean_numeric(&order.delivery_quantity) as i64 - bal_pull as i64;
    let tot_demand_qty_raise = safety_stock_alarm + short_fall_demand_qty;

    let (demand_dt_prod, dem_sea, dem_air) = demand_milestones(order.creation_date);
    let mat_pos = classify_position(bal_pull, git_qty, next_git_qty);

    debug!(
        matches = matching.len(),
        bal_pull = bal_pull,
        git_qty = git_qty,
        next_git_qty = next_git_qty,
        mat_pos = %mat_pos,
        "对账完成"
    );

    ComputedOrderFields {
        warehouse_stock: warehouse_qty,
        blg_warehouse_stock: bal_pull,
        git_qty,
        next_git_wh_qty: next_git_qty,
        next_git_wh_date,
        safety_stock_alarm,
        short_fall_demand_qty,
        tot_demand_qty_raise,
        demand_dt_prod,
        dem_sea,
        dem_air,
        mat_pos,
    }
}
