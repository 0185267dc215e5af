// ==========================================
// 回收公司模拟系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有失败必须输出 reason
// ==========================================

pub mod clock;
pub mod recycling;
pub mod reservation;
pub mod yield_calc;

// 重导出核心引擎
pub use clock::SimulationClock;
pub use recycling::RecyclingAllocationEngine;
pub use reservation::{OrderReservationEngine, ReservationResult};
pub use yield_calc::YieldCalculator;

use crate::repository::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
///
/// 注意：资源不足、记录不存在等业务性失败不在此处；
/// 它们作为携带 reason 的普通结果值返回（调用方无需按异常类型分支）
#[derive(Error, Debug)]
pub enum EngineError {
    /// 模拟时钟未启动即被读取（配置/编程错误，稳态运行中不应出现）
    #[error("Simulation clock not started.")]
    ClockNotStarted,

    /// 查询对象不存在（仅用于以单个对象为参数的查询，如产出估算）
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
