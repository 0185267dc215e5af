// ==========================================
// 回收公司模拟系统 - 响应封套
// ==========================================
// 职责: 统一的成功/失败响应结构
// 约定: 时间戳为当前模拟时间；时钟未启动时为 None
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通用响应封套
///
/// 调用方只需检查 is_success 与 message，
/// 无需根据错误类型分支（"无库存" 与 "服务异常" 均是普通失败）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub data: Option<T>,
    pub is_success: bool,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl<T> ServiceResponse<T> {
    /// 成功响应
    pub fn success(data: T, message: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            data: Some(data),
            is_success: true,
            message: message.into(),
            timestamp,
        }
    }

    /// 失败响应（不携带数据）
    pub fn failure(message: impl Into<String>, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            data: None,
            is_success: false,
            message: message.into(),
            timestamp,
        }
    }
}
