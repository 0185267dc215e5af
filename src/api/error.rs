// ==========================================
// 回收公司模拟系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository/Engine 错误为用户可读的错误消息
// 说明: 业务性失败（缺货、公司不存在等）不属于此处，
//       它们以 success=false 的响应信封返回
// ==========================================

use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 模拟时钟未启动即被依赖时钟的操作调用
    #[error("Simulation clock not started.")]
    ClockNotStarted,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Repository错误到API错误的转换
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id {}", entity, id))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::CheckConstraintViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseError(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Engine错误到API错误的转换
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ClockNotStarted => ApiError::ClockNotStarted,
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} with id {}", entity, id))
            }
            EngineError::Repository(repo_err) => repo_err.into(),
        }
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_not_found_maps_to_api_not_found() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "order".to_string(),
            id: "42".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn engine_clock_error_maps_to_clock_not_started() {
        let err: ApiError = EngineError::ClockNotStarted.into();
        assert!(matches!(err, ApiError::ClockNotStarted));
        assert_eq!(err.to_string(), "Simulation clock not started.");
    }
}
