// ==========================================
// 回收公司模拟系统 - 手机实体
// ==========================================
// 职责: 手机型号、手机库存、配比行
// ==========================================

use serde::{Deserialize, Serialize};

/// 手机型号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phone {
    pub id: i64,
    pub brand: String,
    pub model: String,
}

/// 手机库存（回收的输入侧）
///
/// 仅由回收分配引擎扣减、由外部收货方增加
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneInventory {
    pub id: i64,
    pub phone_id: i64,
    pub quantity: i64,
}

/// 产出配比行（手机→部件 与 部件→材料 两张配比表按部件内连接后的结果）
///
/// 同一材料可经由多个部件产出，调用方必须按材料累加
#[derive(Debug, Clone)]
pub struct YieldRatioRow {
    pub part_name: String,
    pub parts_per_phone: f64,
    pub material_id: i64,
    pub material_name: String,
    pub material_per_part: f64,
}
