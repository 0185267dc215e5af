// ==========================================
// 回收公司模拟系统 - 公司实体
// ==========================================

use serde::{Deserialize, Serialize};

/// 下单公司（合作方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
}
