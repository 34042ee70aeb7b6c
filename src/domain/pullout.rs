// ==========================================
// SAP 成本核算批处理 - 拉料 / 库存领域模型
// ==========================================
// 用途: 数据源 B（RFC 桥接）与数据源 C（仓库库存），只读
// ==========================================

use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};

/// 拉料 / 预测行（字段名与远程函数返回一致）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulloutRecord {
    #[serde(rename = "KDMAT", default)]
    pub article_no: String,

    #[serde(rename = "PULL_QTY", alias = "P_QTY", default)]
    pub pull_qty: CellValue,

    #[serde(rename = "RECEP_FLG", default)]
    pub received_flag: Option<String>,

    #[serde(rename = "FKIMG", default)]
    pub open_qty: CellValue,

    #[serde(rename = "SDATE", default)]
    pub ship_date: Option<String>, // YYYY-MM-DD

    #[serde(rename = "ETA_DESTI", default)]
    pub eta: Option<String>, // YYYY-MM-DD

    #[serde(rename = "BAL_PULLQTY", default)]
    pub balance_qty: CellValue,
}

impl PulloutRecord {
    pub fn new(article_no: impl Into<String>) -> Self {
        Self {
            article_no: article_no.into(),
            ..Self::default()
        }
    }

    pub fn with_pull_qty(mut self, qty: impl Into<CellValue>) -> Self {
        self.pull_qty = qty.into();
        self
    }

    pub fn with_balance_qty(mut self, qty: impl Into<CellValue>) -> Self {
        self.balance_qty = qty.into();
        self
    }

    pub fn with_open_qty(mut self, qty: impl Into<CellValue>) -> Self {
        self.open_qty = qty.into();
        self
    }

    pub fn with_received_flag(mut self, flag: impl Into<String>) -> Self {
        self.received_flag = Some(flag.into());
        self
    }

    pub fn with_ship_date(mut self, date: impl Into<String>) -> Self {
        self.ship_date = Some(date.into());
        self
    }

    pub fn with_eta(mut self, date: impl Into<String>) -> Self {
        self.eta = Some(date.into());
        self
    }

    /// 是否已收货（RECEP_FLG = "X"）
    pub fn is_received(&self) -> bool {
        self.received_flag.as_deref() == Some("X")
    }
}

/// 仓库库存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseStock {
    pub article_no: String,
    pub quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_remote_pullout_row() {
        let json = r#"{
            "KDMAT": "7512345",
            "P_QTY": "1,200",
            "RECEP_FLG": "",
            "FKIMG": 0,
            "SDATE": "2026-11-03",
            "ETA_DESTI": "2026-12-01",
            "BAL_PULLQTY": 350.0
        }"#;
        let record: PulloutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.article_no, "7512345");
        assert_eq!(record.pull_qty, CellValue::Text("1,200".to_string()));
        assert_eq!(record.open_qty, CellValue::Number(0.0));
        assert_eq!(record.balance_qty, CellValue::Number(350.0));
        assert!(!record.is_received());
    }

    #[test]
    fn test_missing_fields_default() {
        let record: PulloutRecord = serde_json::from_str(r#"{"KDMAT": "A1"}"#).unwrap();
        assert_eq!(record.pull_qty, CellValue::Empty);
        assert!(record.ship_date.is_none());
        assert!(record.eta.is_none());
    }
}
