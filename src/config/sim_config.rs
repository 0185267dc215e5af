// ==========================================
// 回收公司模拟系统 - 运行参数配置
// ==========================================
// 职责: 集中管理引擎常量与可调参数
// 约定: 配置文件缺失或字段缺失时回落到默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 运行参数配置
///
/// 字段说明：
/// - machine_production_rate: 单台机器单次回收可处理的手机数
/// - order_expiry_days: 订单过期偏移（模拟天）
/// - sim_days_per_real_minute: 模拟时钟加速系数（每真实分钟折算的模拟天数）
/// - order_quantity_step_kg: 订单数量粒度约束（None 表示不启用）
/// - auto_recycling_enabled / auto_recycling_interval_secs: 后台自动回收任务
/// - log_json: 日志输出 JSON 行格式（采集管道用）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub machine_production_rate: i64,
    pub order_expiry_days: i64,
    pub sim_days_per_real_minute: f64,
    pub order_quantity_step_kg: Option<f64>,
    pub auto_recycling_enabled: bool,
    pub auto_recycling_interval_secs: u64,
    pub log_json: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            machine_production_rate: 20,
            order_expiry_days: 7,
            sim_days_per_real_minute: 0.5,
            order_quantity_step_kg: None,
            auto_recycling_enabled: false,
            auto_recycling_interval_secs: 120,
            log_json: false,
        }
    }
}

impl SimConfig {
    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 返回
    /// - Ok(SimConfig): 解析后的配置（缺失字段取默认值）
    /// - Err: 文件读取或 JSON 解析失败
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// 加载配置，文件不存在时使用默认值
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("配置文件解析失败，使用默认配置: {}", e);
                }
            }
        }
        Self::default()
    }
}

/// 默认数据目录下的数据库路径
///
/// 优先使用系统数据目录，不可用时回落到当前目录
pub fn default_db_path() -> String {
    let base: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("recycler-sim").join("recycler.db").to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.machine_production_rate, 20);
        assert_eq!(config.order_expiry_days, 7);
        assert_eq!(config.sim_days_per_real_minute, 0.5);
        assert!(config.order_quantity_step_kg.is_none());
        assert!(!config.auto_recycling_enabled);
        assert!(!config.log_json);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "machine_production_rate": 5 }"#).unwrap();

        let config = SimConfig::load_or_default(&path);
        assert_eq!(config.machine_production_rate, 5);
        assert_eq!(config.order_expiry_days, 7);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = SimConfig::load_or_default(Path::new("/nonexistent/config.json"));
        assert_eq!(config.machine_production_rate, 20);
    }
}
