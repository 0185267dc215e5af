// ==========================================
// 回收公司模拟系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + tokio
// 系统定位: 模拟回收公司后端（订单预留 / 回收分配 / 产出估算 / 模拟时钟）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// 后台任务 - 自动回收
pub mod tasks;

// ==========================================
// 重导出核心类型
// ==========================================

pub use api::{ApiError, ApiResult};
pub use app::AppState;
pub use config::SimConfig;
pub use domain::{
    Order, OrderView, PhoneYieldEstimate, RecyclingResult, ServiceResponse,
};
pub use engine::{
    EngineError, EngineResult, OrderReservationEngine, RecyclingAllocationEngine, SimulationClock,
    YieldCalculator,
};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "回收公司模拟系统";
