// ==========================================
// SAP 成本核算批处理 - 数据清洗器
// ==========================================
// 职责: 抓取字符串 → 数值 / 日期
// 失败模式（每个函数固定一种）:
// - clean_*: 失败返回 0.0 哨兵值
// - coerce_* / parse_*: 失败返回 None
// ==========================================

use crate::domain::types::CellValue;
use chrono::NaiveDate;

/// SAP 界面日期格式
pub const SAP_DATE_FORMAT: &str = "%d.%m.%Y";

/// 清洗字符串为数值
///
/// 去除首尾空白后删除所有非 `0-9 . -` 字符再解析，
/// 解析失败返回 0.0。调用方不能把 0.0 当作“确实为零”。
pub fn clean_numeric_str(value: &str) -> f64 {
    let filtered: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    filtered.parse::<f64>().unwrap_or(0.0)
}

/// 清洗单元格为数值（已是数值则原样返回，空值为 0.0）
pub fn clean_numeric(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => clean_numeric_str(s),
        CellValue::Empty => 0.0,
    }
}

/// 严格数值转换：仅去除千分位逗号，其余字符不容忍
///
/// 非数值 / 空值 / 非有限值返回 None
pub fn coerce_numeric_str(value: &str) -> Option<f64> {
    let stripped = value.trim().replace(',', "");
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn coerce_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) | CellValue::Empty => None,
        CellValue::Text(s) => coerce_numeric_str(s),
    }
}

/// 解析 SAP 日期（DD.MM.YYYY）
pub fn parse_sap_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), SAP_DATE_FORMAT).ok()
}

/// 解析 ISO 日期（YYYY-MM-DD，兼容 YYYYMMDD）
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
}

/// 格式化为远程函数参数日期（YYYYMMDD）
pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// 保留两位小数（按实际存储值舍入，恰为一半时取偶数）
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
