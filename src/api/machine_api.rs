// ==========================================
// 回收公司模拟系统 - 机器 API
// ==========================================
// 职责: 回收机器登记、故障/修复上报与查询
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiResult;
use crate::domain::{Machine, ServiceResponse};
use crate::engine::clock::SimulationClock;
use crate::repository::MachineRepository;

/// 机器总览 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSummaryDto {
    pub total: usize,
    pub operational: usize,
    pub machines: Vec<Machine>,
}

/// 机器API
pub struct MachineApi {
    machine_repo: Arc<MachineRepository>,
    clock: Arc<SimulationClock>,
}

impl MachineApi {
    pub fn new(machine_repo: Arc<MachineRepository>, clock: Arc<SimulationClock>) -> Self {
        Self { machine_repo, clock }
    }

    /// 查询全部机器及可运转统计
    pub fn get_machines(&self) -> ApiResult<ServiceResponse<MachineSummaryDto>> {
        let machines = self.machine_repo.get_all()?;
        let operational = machines.iter().filter(|m| m.is_operational).count();
        let summary = MachineSummaryDto {
            total: machines.len(),
            operational,
            machines,
        };
        Ok(ServiceResponse::success(
            summary,
            "Machines retrieved",
            self.clock.now().ok(),
        ))
    }

    /// 登记新机器（初始均为可运转）
    #[instrument(skip(self))]
    pub fn register_machines(&self, count: i64) -> ApiResult<ServiceResponse<MachineSummaryDto>> {
        if count <= 0 {
            return Ok(ServiceResponse::failure(
                "Machine count must be greater than zero.",
                self.clock.now().ok(),
            ));
        }
        for _ in 0..count {
            self.machine_repo.create(true)?;
        }
        info!(count, "机器登记完成");
        self.get_machines()
    }

    /// 上报机器故障（指定台数标记为不可运转）
    #[instrument(skip(self))]
    pub fn report_failure(&self, count: i64) -> ApiResult<ServiceResponse<MachineSummaryDto>> {
        if count <= 0 {
            return Ok(ServiceResponse::failure(
                "Machine count must be greater than zero.",
                self.clock.now().ok(),
            ));
        }
        let affected = self.machine_repo.mark_operational(count, false)?;
        info!(requested = count, affected, "机器故障上报");
        self.get_machines()
    }

    /// 上报机器修复完成（指定台数恢复可运转）
    #[instrument(skip(self))]
    pub fn report_repaired(&self, count: i64) -> ApiResult<ServiceResponse<MachineSummaryDto>> {
        if count <= 0 {
            return Ok(ServiceResponse::failure(
                "Machine count must be greater than zero.",
                self.clock.now().ok(),
            ));
        }
        let affected = self.machine_repo.mark_operational(count, true)?;
        info!(requested = count, affected, "机器修复上报");
        self.get_machines()
    }
}
