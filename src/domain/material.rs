// ==========================================
// 回收公司模拟系统 - 原材料实体
// ==========================================
// 职责: 原材料主数据与材料库存
// 约束: 库存数量恒 >= 0（数据库 CHECK 兜底）
// ==========================================

use serde::{Deserialize, Serialize};

/// 原材料主数据
///
/// name 全局唯一（大小写不敏感），价格由外部行情方更新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterial {
    pub id: i64,
    pub name: String,
    pub price_per_kg: f64,
}

/// 材料库存
///
/// available 仅在预留时减少、回收时增加；
/// reserved 仅在预留时增加，两者在一次预留提交内等量变动
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInventory {
    pub id: i64,
    pub material_id: i64,
    pub available_quantity_kg: f64,
    pub reserved_quantity_kg: f64,
}

/// 行情/库存组合视图（对外展示用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialPrice {
    pub name: String,
    pub price_per_kg: f64,
    pub available_quantity_kg: f64,
}
