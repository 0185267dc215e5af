// ==========================================
// 回收公司模拟系统 - 模拟控制 API
// ==========================================
// 职责: 启动/重置模拟、读取当前模拟时间
// 约定: 启动即重置（清空订单、清零手机/材料库存、时钟回到纪元）
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::ServiceResponse;
use crate::engine::clock::{simulation_epoch, SimulationClock};
use crate::repository::{
    MaterialInventoryRepository, OrderRepository, PhoneInventoryRepository, RepositoryError,
};

/// 模拟状态 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatusDto {
    pub started: bool,
    pub simulation_time: Option<DateTime<Utc>>,
    pub epoch: DateTime<Utc>,
}

/// 模拟控制API
pub struct SimulationApi {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<SimulationClock>,
}

impl SimulationApi {
    pub fn new(conn: Arc<Mutex<Connection>>, clock: Arc<SimulationClock>) -> Self {
        Self { conn, clock }
    }

    /// 启动（或重启）模拟
    ///
    /// 同一事务内：删除全部订单、清零手机与材料库存；
    /// 提交成功后时钟锚定（缺省为当前真实时间，可传 Unix 秒数指定锚点），
    /// 模拟时间回到纪元
    #[instrument(skip(self))]
    pub fn start_simulation(
        &self,
        real_anchor_epoch_secs: Option<i64>,
    ) -> ApiResult<ServiceResponse<SimulationStatusDto>> {
        {
            let mut guard = self
                .conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            let tx = guard
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(RepositoryError::from)?;

            OrderRepository::delete_all_in(&tx)?;
            PhoneInventoryRepository::reset_all_in(&tx)?;
            MaterialInventoryRepository::reset_all_in(&tx)?;

            tx.commit().map_err(RepositoryError::from)?;
        }

        // 状态归零后再锚定时钟，失败时不会出现"新时钟旧数据"
        let anchor = match real_anchor_epoch_secs {
            Some(secs) => Some(
                DateTime::<Utc>::from_timestamp(secs, 0)
                    .ok_or_else(|| ApiError::InvalidInput(format!("invalid epoch seconds: {}", secs)))?,
            ),
            None => None,
        };
        self.clock.start(anchor);
        let epoch = simulation_epoch();
        info!(%epoch, "模拟已启动");

        Ok(ServiceResponse::success(
            SimulationStatusDto {
                started: true,
                simulation_time: Some(epoch),
                epoch,
            },
            "Simulation started",
            Some(epoch),
        ))
    }

    /// 读取当前模拟时间与运行状态
    pub fn current_time(&self) -> ApiResult<ServiceResponse<SimulationStatusDto>> {
        let simulation_time = self.clock.now().ok();
        let status = SimulationStatusDto {
            started: self.clock.is_started(),
            simulation_time,
            epoch: simulation_epoch(),
        };
        let message = if status.started {
            "Simulation running"
        } else {
            "Simulation not started"
        };
        Ok(ServiceResponse::success(status, message, simulation_time))
    }
}
