// ==========================================
// 回收公司模拟系统 - 配置层
// ==========================================
// 职责: 运行参数加载、默认值管理
// 存储: JSON 配置文件（可选，缺省时全部使用默认值）
// ==========================================

pub mod sim_config;

pub use sim_config::{default_db_path, SimConfig};
