// ==========================================
// 回收公司模拟系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 全部仓储/引擎/API共享同一个数据库连接
// ==========================================

use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::api::{MachineApi, MaterialApi, OrderApi, RecyclingApi, SimulationApi};
use crate::config::SimConfig;
use crate::db;
use crate::engine::clock::SimulationClock;
use crate::engine::recycling::RecyclingAllocationEngine;
use crate::engine::reservation::OrderReservationEngine;
use crate::engine::yield_calc::YieldCalculator;
use crate::repository::phone_repo::{PhoneInventoryRepository, PhoneRepository};
use crate::repository::{
    CompanyRepository, MachineRepository, MaterialInventoryRepository, OrderItemRepository,
    OrderRepository, OrderStatusRepository, RatioRepository, RawMaterialRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 共享数据库连接
    pub conn: Arc<Mutex<Connection>>,

    /// 模拟时钟
    pub clock: Arc<SimulationClock>,

    /// 订单API
    pub order_api: Arc<OrderApi>,

    /// 回收API
    pub recycling_api: Arc<RecyclingApi>,

    /// 原材料API
    pub material_api: Arc<MaterialApi>,

    /// 机器API
    pub machine_api: Arc<MachineApi>,

    /// 模拟控制API
    pub simulation_api: Arc<SimulationApi>,

    /// 公司仓储（公司登记命令用）
    pub company_repo: Arc<CompanyRepository>,

    /// 配比仓储（种子数据写入用）
    pub ratio_repo: Arc<RatioRepository>,
}

impl AppState {
    /// 按数据库路径创建应用状态
    ///
    /// 打开连接、执行建表脚本，然后完成全部装配
    pub fn new(db_path: &str, config: &SimConfig) -> anyhow::Result<Self> {
        tracing::info!(db_path, "初始化 AppState");
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
        }
        let conn = db::open_sqlite_connection(db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        db::init_schema(&conn).context("建表脚本执行失败")?;
        Ok(Self::from_connection(conn, config))
    }

    /// 从已配置好的连接装配应用状态（测试用内存库也走此入口）
    pub fn from_connection(conn: Connection, config: &SimConfig) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        let clock = Arc::new(SimulationClock::with_acceleration(
            config.sim_days_per_real_minute,
        ));

        // ==========================================
        // Repository 层
        // ==========================================
        let company_repo = Arc::new(CompanyRepository::from_connection(conn.clone()));
        let material_repo = Arc::new(RawMaterialRepository::from_connection(conn.clone()));
        let material_inventory_repo =
            Arc::new(MaterialInventoryRepository::from_connection(conn.clone()));
        let order_repo = Arc::new(OrderRepository::from_connection(conn.clone()));
        let order_item_repo = Arc::new(OrderItemRepository::from_connection(conn.clone()));
        let order_status_repo = Arc::new(OrderStatusRepository::from_connection(conn.clone()));
        let phone_repo = Arc::new(PhoneRepository::from_connection(conn.clone()));
        let phone_inventory_repo =
            Arc::new(PhoneInventoryRepository::from_connection(conn.clone()));
        let machine_repo = Arc::new(MachineRepository::from_connection(conn.clone()));
        let ratio_repo = Arc::new(RatioRepository::from_connection(conn.clone()));

        // ==========================================
        // Engine 层
        // ==========================================
        let reservation_engine = Arc::new(OrderReservationEngine::new(
            conn.clone(),
            clock.clone(),
            config.order_expiry_days,
            config.order_quantity_step_kg,
        ));
        let recycling_engine = Arc::new(RecyclingAllocationEngine::new(
            conn.clone(),
            clock.clone(),
            config.machine_production_rate,
        ));
        let yield_calculator = Arc::new(YieldCalculator::from_connection(conn.clone()));

        // ==========================================
        // API 层
        // ==========================================
        let order_api = Arc::new(OrderApi::new(
            reservation_engine,
            order_repo,
            order_item_repo,
            order_status_repo,
            material_repo.clone(),
            clock.clone(),
        ));
        let recycling_api = Arc::new(RecyclingApi::new(
            recycling_engine,
            yield_calculator,
            phone_repo,
            phone_inventory_repo,
            material_repo.clone(),
            material_inventory_repo.clone(),
            clock.clone(),
        ));
        let material_api = Arc::new(MaterialApi::new(
            conn.clone(),
            material_repo,
            material_inventory_repo,
            clock.clone(),
        ));
        let machine_api = Arc::new(MachineApi::new(machine_repo, clock.clone()));
        let simulation_api = Arc::new(SimulationApi::new(conn.clone(), clock.clone()));

        Self {
            conn,
            clock,
            order_api,
            recycling_api,
            material_api,
            machine_api,
            simulation_api,
            company_repo,
            ratio_repo,
        }
    }
}
