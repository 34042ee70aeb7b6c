// ==========================================
// SAP 成本核算批处理 - 单价选择器
// ==========================================
// 严格优先级（取第一个非空来源，不做混合）:
// 1. 现货 / 期间平均价
// 2. 采购订单历史均价（固定行位置）
// 3. 库存评估均价
// 0 与非有限值视为空
// ==========================================

use crate::domain::price::{OrderHistoryLine, PriceQuote, SpotQuote};
use crate::domain::types::PriceSource;

/// 订单历史均价取数据清洗后的第 3 行
pub const ORDER_HISTORY_ROW: usize = 2;

/// 单价候选（每个来源至多一个值）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceCandidates {
    pub spot: Option<f64>,
    pub order_average: Option<f64>,
    pub inventory_average: Option<f64>,
}

impl PriceCandidates {
    fn by_priority(&self) -> [(PriceSource, Option<f64>); 3] {
        [
            (PriceSource::Spot, self.spot),
            (PriceSource::OrderAvg, self.order_average),
            (PriceSource::InventoryAvg, self.inventory_average),
        ]
    }
}

fn usable_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// 按优先级选择生效单价，三个来源都为空时返回 None（调用方跳过该物料）
pub fn select_unit_price(
    plant: &str,
    material: &str,
    candidates: &PriceCandidates,
) -> Option<PriceQuote> {
    candidates
        .by_priority()
        .into_iter()
        .find_map(|(source, value)| usable_price(value).map(|price| (source, price)))
        .map(|(source, unit_price)| PriceQuote {
            plant: plant.to_string(),
            material: material.to_string(),
            source,
            unit_price,
        })
}

/// 选择有效期截止日最晚的报价
///
/// 截止日为空的报价排在最后；截止日相同取先出现者
pub fn select_spot_quote(quotes: &[SpotQuote]) -> Option<&SpotQuote> {
    quotes.iter().fold(None, |best: Option<&SpotQuote>, quote| match best {
        None => Some(quote),
        Some(current) if quote.valid_to > current.valid_to => Some(quote),
        Some(current) => Some(current),
    })
}

/// 现货价：最晚报价的价格（该价格为空时不回退到更早的报价）
pub fn spot_price(quotes: &[SpotQuote]) -> Option<f64> {
    select_spot_quote(quotes).and_then(|q| usable_price(q.price))
}

/// 订单历史均价：固定第 3 行的 净订单金额 / 订单数量
pub fn order_history_average(lines: &[OrderHistoryLine]) -> Option<f64> {
    let line = lines.get(ORDER_HISTORY_ROW)?;
    if line.order_quantity == 0.0 {
        return None;
    }
    usable_price(Some(line.net_order_value / line.order_quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(valid_to: Option<(i32, u32, u32)>, price: Option<f64>) -> SpotQuote {
        SpotQuote {
            valid_from: None,
            valid_to: valid_to.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            price,
        }
    }

    fn line(qty: f64, value: f64) -> OrderHistoryLine {
        OrderHistoryLine {
            order_quantity: qty,
            net_order_value: value,
        }
    }

    #[test]
    fn test_spot_wins_over_order_average() {
        let candidates = PriceCandidates {
            spot: Some(12.0),
            order_average: Some(11.0),
            inventory_average: Some(10.0),
        };
        let quote = select_unit_price("1100", "M-1", &candidates).unwrap();
        assert_eq!(quote.source, PriceSource::Spot);
        assert_eq!(quote.unit_price, 12.0);
        assert_eq!(quote.plant, "1100");
    }

    #[test]
    fn test_falls_through_empty_and_zero_sources() {
        let candidates = PriceCandidates {
            spot: Some(0.0),
            order_average: None,
            inventory_average: Some(9.5),
        };
        let quote = select_unit_price("2650", "M-2", &candidates).unwrap();
        assert_eq!(quote.source, PriceSource::InventoryAvg);
        assert_eq!(quote.unit_price, 9.5);
    }

    #[test]
    fn test_no_source_is_none() {
        assert!(select_unit_price("1100", "M-3", &PriceCandidates::default()).is_none());
    }

    #[test]
    fn test_latest_valid_to_wins() {
        let quotes = vec![
            quote(Some((2024, 3, 31)), Some(100.0)),
            quote(None, Some(500.0)),
            quote(Some((2024, 12, 31)), Some(120.0)),
            quote(Some((2024, 6, 30)), Some(110.0)),
        ];
        assert_eq!(spot_price(&quotes), Some(120.0));
    }

    #[test]
    fn test_latest_quote_without_price_does_not_fall_back() {
        let quotes = vec![
            quote(Some((2024, 3, 31)), Some(100.0)),
            quote(Some((2024, 12, 31)), None),
        ];
        assert_eq!(spot_price(&quotes), None);
        assert_eq!(spot_price(&[]), None);
    }

    #[test]
    fn test_order_history_uses_third_row() {
        let lines = vec![line(10.0, 1000.0), line(20.0, 2400.0), line(40.0, 4400.0)];
        assert_eq!(order_history_average(&lines), Some(110.0));
        assert_eq!(order_history_average(&lines[..2]), None);
        assert_eq!(order_history_average(&[line(1.0, 1.0), line(1.0, 1.0), line(0.0, 5.0)]), None);
    }
}
