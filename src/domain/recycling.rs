// ==========================================
// 回收公司模拟系统 - 回收结果对象
// ==========================================
// 职责: 回收运行结果、产出估算
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单种材料的回收产出汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycledMaterialResult {
    pub material_id: i64,
    pub material_name: String,
    pub quantity_kg: f64,
    pub recycled_date: DateTime<Utc>,
    pub source_phone_models: String,
}

/// 一次回收运行的完整结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecyclingResult {
    pub success: bool,
    pub message: String,
    pub recycled_materials: Vec<RecycledMaterialResult>,
    pub total_materials_recycled_kg: f64,
    pub phones_processed: i64,
    pub processing_date: DateTime<Utc>,
}

impl RecyclingResult {
    /// 构造失败结果（未发生任何库存变动）
    pub fn failure(message: impl Into<String>, processing_date: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message: message.into(),
            recycled_materials: Vec::new(),
            total_materials_recycled_kg: 0.0,
            phones_processed: 0,
            processing_date,
        }
    }
}

/// 单型号手机的产出估算
///
/// estimated_materials 使用 BTreeMap 保证输出顺序确定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneYieldEstimate {
    pub phone_id: i64,
    pub phone_model: String,
    pub brand: String,
    pub estimated_materials: BTreeMap<String, f64>,
    pub total_estimated_kg: f64,
}
