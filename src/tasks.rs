// ==========================================
// 回收公司模拟系统 - 后台任务
// ==========================================
// 职责: 周期性自动回收（可配置开关与周期）
// 说明: 任务失败只记日志不退出，下一周期继续
// ==========================================

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::config::SimConfig;

/// 启动周期性自动回收任务
///
/// 配置未启用时返回 None
pub fn spawn_auto_recycling(state: Arc<AppState>, config: &SimConfig) -> Option<JoinHandle<()>> {
    if !config.auto_recycling_enabled {
        info!("自动回收未启用");
        return None;
    }

    let interval_secs = config.auto_recycling_interval_secs.max(1);
    info!(interval_secs, "自动回收任务启动");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // 首个 tick 立即到期，跳过以避免启动即回收
        ticker.tick().await;

        loop {
            ticker.tick().await;
            // SQLite 访问是同步阻塞的，移出 tokio 工作线程执行
            let api = state.recycling_api.clone();
            let outcome = tokio::task::spawn_blocking(move || api.start_recycling()).await;
            match outcome {
                Ok(Ok(response)) if response.is_success => {
                    info!(message = %response.message, "自动回收完成");
                }
                Ok(Ok(response)) => {
                    // 无手机/无机器属正常工况
                    info!(message = %response.message, "自动回收跳过");
                }
                Ok(Err(e)) => {
                    error!(error = %e, "自动回收失败");
                }
                Err(e) => {
                    error!(error = %e, "自动回收任务执行失败");
                }
            }
        }
    }))
}

/// 停止后台任务
pub fn shutdown(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        handle.abort();
        warn!("后台任务已停止");
    }
}
