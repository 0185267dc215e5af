// ==========================================
// 回收公司模拟系统 - 回收机器实体
// ==========================================

use serde::{Deserialize, Serialize};

/// 回收机器
///
/// is_operational 由外部故障/维修通知方翻转，引擎只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub is_operational: bool,
}
