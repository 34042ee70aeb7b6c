// ==========================================
// SAP 成本核算批处理 - 原始表格
// ==========================================
// 用途: 抓取屏幕 / CSV / Excel 解析后的统一中间结构
// 列按表头文本定位（成本分解表除外，按位置）
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按表头文本查找列号（忽略首尾空白）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// 查找一组必需列，返回缺失列名
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>, Vec<String>> {
        let mut indexes = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(idx) => indexes.push(idx),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(indexes)
        } else {
            Err(missing)
        }
    }

    /// 取单元格文本，越界返回空串
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}
