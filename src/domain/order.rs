// ==========================================
// 回收公司模拟系统 - 订单实体
// ==========================================
// 职责: 订单、订单项、订单状态
// 约定: 订单时间戳均为模拟时间；订单项价格为预留当时的快照
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 订单状态（枚举表行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatus {
    pub id: i64,
    pub name: String,
}

/// 订单
///
/// 仅由成功的预留创建；创建后除状态外不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_number: Uuid,
    pub company_id: i64,
    pub order_status_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// 订单项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub material_id: i64,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
}

/// 订单完整视图（订单 + 状态 + 订单项）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub order_id: i64,
    pub order_number: Uuid,
    pub company_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub order_items: Vec<OrderItemView>,
}

/// 订单项视图（附材料名称）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemView {
    pub material_id: i64,
    pub material_name: String,
    pub quantity_kg: f64,
    pub price_per_kg: f64,
}
