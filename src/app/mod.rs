// ==========================================
// 回收公司模拟系统 - 应用装配层
// ==========================================

pub mod state;

pub use state::AppState;
