// ==========================================
// SAP 成本核算批处理 - 屏幕表格 → 领域记录
// ==========================================
// 列一律按表头文本定位
// 数值: 去千分位逗号后严格转换，非数值行丢弃
// 日期: DD.MM.YYYY，无法解析记为 None
// ==========================================

use crate::domain::price::{ExchangeRate, OrderHistoryLine, SpotQuote};
use crate::domain::table::RawTable;
use crate::importer::data_cleaner::{coerce_numeric_str, parse_sap_date};
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;

// ===== 条件价格表 =====
pub const PRICE_COLUMN: &str = "Price";
pub const VALID_FROM_COLUMN: &str = "Valid From";
pub const VALID_TO_COLUMN: &str = "Valid To";

// ===== 期间评估表 =====
pub const TOTAL_VALUE_COLUMN: &str = "Total Value";
pub const TOTAL_QUANTITY_COLUMN: &str = "Total Quantity";

// ===== 采购订单历史 =====
pub const ORDER_QUANTITY_COLUMN: &str = "Order Quantity";
pub const NET_ORDER_VALUE_COLUMN: &str = "Net Order Value";

// ===== 汇率表 =====
pub const RATE_TYPE_COLUMN: &str = "EXCHANGE RATE TYPE";
pub const FROM_CURRENCY_COLUMN: &str = "FROM CURRENCY";
pub const TO_CURRENCY_COLUMN: &str = "TO CURRENCY";
pub const DATE_COLUMN: &str = "DATE";
pub const RATE_COLUMN: &str = "EXCHANGE-RATE";

fn require(table: &RawTable, names: &[&str]) -> ImportResult<Vec<usize>> {
    table.require_columns(names).map_err(ImportError::MissingColumns)
}

/// 条件价格表 → 现货报价（保留全部行，选择交给价格选择器）
pub fn parse_spot_quotes(table: &RawTable) -> ImportResult<Vec<SpotQuote>> {
    let idx = require(table, &[PRICE_COLUMN, VALID_TO_COLUMN])?;
    let from_idx = table.column_index(VALID_FROM_COLUMN);

    Ok((0..table.rows.len())
        .map(|row| SpotQuote {
            valid_from: from_idx.and_then(|c| parse_sap_date(table.cell(row, c))),
            valid_to: parse_sap_date(table.cell(row, idx[1])),
            price: coerce_numeric_str(table.cell(row, idx[0])),
        })
        .collect())
}

/// 期间评估表 → 期间平均价（总金额 / 总数量）
///
/// 每行一条报价，有效期为查询窗口 [from, to]
pub fn parse_period_valuation(
    table: &RawTable,
    from: NaiveDate,
    to: NaiveDate,
) -> ImportResult<Vec<SpotQuote>> {
    let idx = require(table, &[TOTAL_VALUE_COLUMN, TOTAL_QUANTITY_COLUMN])?;

    Ok((0..table.rows.len())
        .map(|row| {
            let value = coerce_numeric_str(table.cell(row, idx[0]));
            let quantity = coerce_numeric_str(table.cell(row, idx[1]));
            let price = match (value, quantity) {
                (Some(v), Some(q)) if q != 0.0 => Some(v / q),
                _ => None,
            };
            SpotQuote {
                valid_from: Some(from),
                valid_to: Some(to),
                price,
            }
        })
        .collect())
}

/// 采购订单历史 → 数值行（任一列非数值的行丢弃）
///
/// # 返回
/// - Err(EmptyTable): 无数据行，或清洗后无数值行
pub fn parse_order_history(table: &RawTable) -> ImportResult<Vec<OrderHistoryLine>> {
    let idx = require(table, &[ORDER_QUANTITY_COLUMN, NET_ORDER_VALUE_COLUMN])?;
    if table.is_empty() {
        return Err(ImportError::EmptyTable("采购订单历史无数据行".to_string()));
    }

    let lines: Vec<OrderHistoryLine> = (0..table.rows.len())
        .filter_map(|row| {
            let order_quantity = coerce_numeric_str(table.cell(row, idx[0]))?;
            let net_order_value = coerce_numeric_str(table.cell(row, idx[1]))?;
            Some(OrderHistoryLine {
                order_quantity,
                net_order_value,
            })
        })
        .collect();

    if lines.is_empty() {
        return Err(ImportError::EmptyTable("采购订单历史无有效数值行".to_string()));
    }
    Ok(lines)
}

/// 库存评估均价（单字段屏幕）
pub fn parse_inventory_valuation(text: &str) -> Option<f64> {
    coerce_numeric_str(text)
}

/// 汇率表 → 汇率记录（日期或汇率无法解析的行丢弃）
pub fn parse_exchange_rates(table: &RawTable) -> ImportResult<Vec<ExchangeRate>> {
    let idx = require(
        table,
        &[
            RATE_TYPE_COLUMN,
            FROM_CURRENCY_COLUMN,
            TO_CURRENCY_COLUMN,
            DATE_COLUMN,
            RATE_COLUMN,
        ],
    )?;

    Ok((0..table.rows.len())
        .filter_map(|row| {
            let date = parse_sap_date(table.cell(row, idx[3]))?;
            let rate = coerce_numeric_str(table.cell(row, idx[4]))?;
            let rate_type = table.cell(row, idx[0]).trim();
            Some(ExchangeRate {
                rate_type: (!rate_type.is_empty()).then(|| rate_type.to_string()),
                from_currency: table.cell(row, idx[1]).trim().to_string(),
                to_currency: table.cell(row, idx[2]).trim().to_string(),
                date,
                rate,
            })
        })
        .collect())
}
