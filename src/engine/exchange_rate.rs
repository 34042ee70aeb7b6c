// ==========================================
// SAP 成本核算批处理 - 汇率选择 / 查询窗口
// ==========================================

use crate::domain::price::ExchangeRate;
use chrono::{Datelike, Duration, NaiveDate};

/// 选择 from → to 的最新汇率
///
/// 无匹配行或空表返回 None；日期相同取先出现者
pub fn select_exchange_rate<'a>(
    rates: &'a [ExchangeRate],
    from_currency: &str,
    to_currency: &str,
) -> Option<&'a ExchangeRate> {
    rates
        .iter()
        .filter(|r| r.from_currency == from_currency && r.to_currency == to_currency)
        .fold(None, |best: Option<&ExchangeRate>, rate| match best {
            Some(current) if rate.date <= current.date => Some(current),
            _ => Some(rate),
        })
}

/// 月份首末日
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first - Duration::days(1)))
}

/// 汇率查询窗口：上一个自然月
pub fn previous_month_window(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month) = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    month_bounds(year, month)
}

/// 期间评估查询窗口（按优先顺序）:
/// 今年 1 月至本月末、去年全年、前年全年
pub fn period_windows(today: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let year = today.year();
    let mut windows = Vec::with_capacity(3);
    if let (Some(start), Some((_, end))) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        month_bounds(year, today.month()),
    ) {
        windows.push((start, end));
    }
    for back in 1..=2 {
        if let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year - back, 1, 1),
            NaiveDate::from_ymd_opt(year - back, 12, 31),
        ) {
            windows.push((start, end));
        }
    }
    windows
}
