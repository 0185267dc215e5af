// ==========================================
// 回收公司模拟系统 - 服务主入口
// ==========================================
// 启动流程: 日志 → 配置 → 数据库/AppState → 启动模拟 → 后台任务 → 等待退出
// ==========================================

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use recycler_sim::app::AppState;
use recycler_sim::config::{default_db_path, SimConfig};
use recycler_sim::{logging, tasks};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 配置: 首个命令行参数可指定配置文件，缺省走默认值
    // 日志格式由配置决定，因此先读配置再初始化日志
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_or_default(Path::new(&path)),
        None => SimConfig::default(),
    };
    logging::init(config.log_json);

    tracing::info!("==================================================");
    tracing::info!("{}", recycler_sim::APP_NAME);
    tracing::info!("系统版本: {}", recycler_sim::VERSION);
    tracing::info!("==================================================");

    let db_path = default_db_path();
    tracing::info!(db_path, "使用数据库");

    let state = Arc::new(AppState::new(&db_path, &config).context("AppState 初始化失败")?);

    // 启动即重置并锚定模拟时钟
    let response = state
        .simulation_api
        .start_simulation(None)
        .context("模拟启动失败")?;
    tracing::info!(message = %response.message, "模拟时钟已锚定");

    let auto_recycling = tasks::spawn_auto_recycling(state.clone(), &config);

    tokio::signal::ctrl_c().await.context("等待退出信号失败")?;
    tracing::info!("收到退出信号，正在停止");
    tasks::shutdown(auto_recycling);

    Ok(())
}
