// ==========================================
// SAP 成本核算批处理 - 成本计算引擎
// ==========================================
// 输入: 单个物料的成本分解行（工序正序）+ 单价 + 汇率 + 现货价
// 输出: 成本明细行 + 合计行
// ==========================================
// 计算步骤:
// 1. 重量 / 废料重量转数值，废料重量非数值的行丢弃
// 2. 基准重量 = 最后一个非空原材料重量
// 3. 逆序扣减废料重量，写入 scrap3_weight
// 4. 废料成本 = 最后一个有效废料单价 × 行废料重量
// 5. 毛成本仅写在末行，重量取倒数第二个非空原材料重量
// 6. 净成本自末行逆序扣减 |废料成本|
// 7. 合计行 + 币种换算
// 所有舍入在赋值时进行（两位小数），累计值本身不舍入
// ==========================================

use crate::domain::costing::{CostBreakdown, CostRow, MaterialRow, GRAND_TOTAL_LABEL};
use crate::error::{JobError, JobResult};
use crate::importer::data_cleaner::{coerce_numeric, round2};
use tracing::{debug, instrument};

/// 汇率 / 价格仅在有限且非零时可用
fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

// ==========================================
// CostingEngine - 成本计算引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct CostingEngine;

impl CostingEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算单个物料的成本明细
    ///
    /// # 参数
    /// - rows: 成本分解行（工序正序）
    /// - unit_price: 生效单价
    /// - exchange_rate: 美元 → 本币汇率，无则 net_rm_usd 为空
    /// - spot_price: 现货价，无则 price_in_local 为空
    ///
    /// # 返回
    /// - Err(DataShape): 无有效行，或无任何原材料重量
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn compute(
        &self,
        rows: &[MaterialRow],
        unit_price: f64,
        exchange_rate: Option<f64>,
        spot_price: Option<f64>,
    ) -> JobResult<CostBreakdown> {
        // 1. 转数值并丢弃废料重量非数值的行
        let mut cost_rows: Vec<CostRow> = rows
            .iter()
            .filter_map(|row| {
                let scrap_weight = coerce_numeric(&row.scrap_weight)?;
                Some(CostRow {
                    label: row.label.clone(),
                    raw_material_weight: coerce_numeric(&row.raw_material_weight),
                    scrap_weight: Some(scrap_weight),
                    scrap_rate: coerce_numeric(&row.scrap_rate),
                    ..CostRow::default()
                })
            })
            .collect();

        if cost_rows.is_empty() {
            return Err(JobError::DataShape("成本分解表无有效废料重量行".to_string()));
        }

        // 2. 基准重量
        let weights: Vec<f64> = cost_rows
            .iter()
            .filter_map(|r| r.raw_material_weight)
            .collect();
        let base_weight = *weights
            .last()
            .ok_or_else(|| JobError::DataShape("成本分解表无原材料重量".to_string()))?;

        // 3. 废料重量逆序扣减
        let mut current = base_weight;
        for row in cost_rows.iter_mut().rev() {
            current -= row.scrap_weight.unwrap_or(0.0).abs();
            row.scrap3_weight = Some(current);
        }

        // 4. 废料成本
        let scrap_rate = cost_rows.iter().filter_map(|r| r.scrap_rate).last();
        if let Some(rate) = scrap_rate {
            for row in cost_rows.iter_mut() {
                row.scrap_cost = row.scrap_weight.map(|w| rate * w);
            }
        }

        // 5. 毛成本（至少两个非空重量）
        let gross_rm = if weights.len() >= 2 {
            let weight = weights[weights.len() - 2];
            Some(round2(unit_price * weight))
        } else {
            debug!(weights = weights.len(), "非空原材料重量不足两个，毛成本为空");
            None
        };
        if let Some(last) = cost_rows.last_mut() {
            last.gross_rm = gross_rm;
        }

        // 6. 净成本逆序累计
        if let Some(gross) = gross_rm {
            let mut net = gross;
            for row in cost_rows.iter_mut().rev() {
                net -= row.scrap_cost.unwrap_or(0.0).abs();
                row.net_rm = Some(round2(net));
            }
        }

        // 7. 合计行
        let grand_total = self.grand_total(
            &cost_rows,
            base_weight,
            gross_rm,
            scrap_rate.is_some(),
            exchange_rate,
            spot_price,
        );

        Ok(CostBreakdown {
            rows: cost_rows,
            grand_total,
        })
    }

    fn grand_total(
        &self,
        rows: &[CostRow],
        base_weight: f64,
        gross_rm: Option<f64>,
        has_scrap_cost: bool,
        exchange_rate: Option<f64>,
        spot_price: Option<f64>,
    ) -> CostRow {
        let net_rm = rows.iter().find_map(|r| r.net_rm);
        let net_rm_usd = match (net_rm, usable(exchange_rate)) {
            (Some(net), Some(rate)) => Some(round2(net / rate)),
            _ => None,
        };
        let spot_price = usable(spot_price);
        let price_in_local = match (net_rm_usd, spot_price) {
            (Some(usd), Some(spot)) => Some(round2(usd / spot)),
            _ => None,
        };

        CostRow {
            label: GRAND_TOTAL_LABEL.to_string(),
            raw_material_weight: Some(base_weight),
            scrap_weight: Some(rows.iter().filter_map(|r| r.scrap_weight).sum()),
            scrap_cost: has_scrap_cost.then(|| rows.iter().filter_map(|r| r.scrap_cost).sum()),
            gross_rm,
            net_rm,
            net_rm_usd,
            spot_price,
            price_in_local,
            ..CostRow::default()
        }
    }
}
