// ==========================================
// SAP 成本核算批处理 - 运行期记录
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 待处理的工厂 / 物料组合
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlantMaterial {
    pub plant: String,
    pub material: String,
}

impl PlantMaterial {
    pub fn new(plant: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            plant: plant.into(),
            material: material.into(),
        }
    }
}

impl fmt::Display for PlantMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.plant, self.material)
    }
}

/// 失败 / 跳过记录（运行结束时统一输出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRecord {
    pub plant: String,
    pub material: String,
    pub reason: String,
}

impl FailedRecord {
    pub fn new(item: &PlantMaterial, reason: impl Into<String>) -> Self {
        Self {
            plant: item.plant.clone(),
            material: item.material.clone(),
            reason: reason.into(),
        }
    }
}
