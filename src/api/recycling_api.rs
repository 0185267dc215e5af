// ==========================================
// 回收公司模拟系统 - 回收 API
// ==========================================
// 职责: 触发回收运行、产出估算、手机/材料库存查询、手机入库
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{PhoneYieldEstimate, RecyclingResult, ServiceResponse};
use crate::engine::clock::SimulationClock;
use crate::engine::recycling::RecyclingAllocationEngine;
use crate::engine::yield_calc::YieldCalculator;
use crate::repository::phone_repo::{PhoneInventoryRepository, PhoneInventoryRow, PhoneRepository};
use crate::repository::{MaterialInventoryRepository, RawMaterialRepository};

// ==========================================
// DTO 定义
// ==========================================

/// 可回收手机库存 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailablePhoneDto {
    pub phone_id: i64,
    pub brand: String,
    pub model: String,
    pub quantity: i64,
}

impl From<PhoneInventoryRow> for AvailablePhoneDto {
    fn from(row: PhoneInventoryRow) -> Self {
        Self {
            phone_id: row.phone_id,
            brand: row.brand,
            model: row.model,
            quantity: row.quantity,
        }
    }
}

/// 手机入库请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivePhonesRequest {
    pub phone_id: i64,
    pub quantity: i64,
}

// ==========================================
// RecyclingApi
// ==========================================

/// 回收API
pub struct RecyclingApi {
    recycling_engine: Arc<RecyclingAllocationEngine>,
    yield_calculator: Arc<YieldCalculator>,
    phone_repo: Arc<PhoneRepository>,
    phone_inventory_repo: Arc<PhoneInventoryRepository>,
    material_repo: Arc<RawMaterialRepository>,
    material_inventory_repo: Arc<MaterialInventoryRepository>,
    clock: Arc<SimulationClock>,
}

impl RecyclingApi {
    pub fn new(
        recycling_engine: Arc<RecyclingAllocationEngine>,
        yield_calculator: Arc<YieldCalculator>,
        phone_repo: Arc<PhoneRepository>,
        phone_inventory_repo: Arc<PhoneInventoryRepository>,
        material_repo: Arc<RawMaterialRepository>,
        material_inventory_repo: Arc<MaterialInventoryRepository>,
        clock: Arc<SimulationClock>,
    ) -> Self {
        Self {
            recycling_engine,
            yield_calculator,
            phone_repo,
            phone_inventory_repo,
            material_repo,
            material_inventory_repo,
            clock,
        }
    }

    /// 执行一次回收运行
    ///
    /// 业务性失败（无机器/无可运转机器/无手机）带完整结果对象返回，
    /// is_success 跟随运行结果
    #[instrument(skip(self))]
    pub fn start_recycling(&self) -> ApiResult<ServiceResponse<RecyclingResult>> {
        let result = self.recycling_engine.start_recycling()?;
        let timestamp = Some(result.processing_date);
        Ok(ServiceResponse {
            is_success: result.success,
            message: result.message.clone(),
            data: Some(result),
            timestamp,
        })
    }

    /// 估算指定型号手机的回收产出（只读，不改库存）
    pub fn estimate_yield(
        &self,
        phone_id: i64,
        quantity: i64,
    ) -> ApiResult<ServiceResponse<PhoneYieldEstimate>> {
        if quantity <= 0 {
            return Ok(ServiceResponse::failure(
                "Quantity must be greater than zero.",
                self.clock.now().ok(),
            ));
        }
        let estimate = self.yield_calculator.estimate(phone_id, quantity)?;
        Ok(ServiceResponse::success(
            estimate,
            "Yield estimated",
            self.clock.now().ok(),
        ))
    }

    /// 查询待回收手机库存（数量降序）
    pub fn get_available_phones(&self) -> ApiResult<ServiceResponse<Vec<AvailablePhoneDto>>> {
        let phones: Vec<AvailablePhoneDto> = self
            .phone_inventory_repo
            .find_available_desc()?
            .into_iter()
            .map(AvailablePhoneDto::from)
            .collect();
        Ok(ServiceResponse::success(
            phones,
            "Available phones retrieved",
            self.clock.now().ok(),
        ))
    }

    /// 手机入库（模拟公众送回旧手机）
    #[instrument(skip(self))]
    pub fn receive_phones(
        &self,
        request: &ReceivePhonesRequest,
    ) -> ApiResult<ServiceResponse<AvailablePhoneDto>> {
        if request.quantity <= 0 {
            return Ok(ServiceResponse::failure(
                "Quantity must be greater than zero.",
                self.clock.now().ok(),
            ));
        }
        let phone = self
            .phone_repo
            .find_by_id(request.phone_id)?
            .ok_or_else(|| ApiError::NotFound(format!("phone with id {}", request.phone_id)))?;

        self.phone_inventory_repo
            .add_quantity(phone.id, request.quantity)?;
        info!(phone_id = phone.id, quantity = request.quantity, "手机入库完成");

        let updated_quantity = self
            .phone_inventory_repo
            .find_by_phone_id(phone.id)?
            .map(|inv| inv.quantity)
            .unwrap_or(request.quantity);

        Ok(ServiceResponse::success(
            AvailablePhoneDto {
                phone_id: phone.id,
                brand: phone.brand,
                model: phone.model,
                quantity: updated_quantity,
            },
            "Phones received",
            self.clock.now().ok(),
        ))
    }

    /// 查询材料库存（材料名 → 可用 kg），名称字典序
    pub fn get_material_inventory(&self) -> ApiResult<ServiceResponse<BTreeMap<String, f64>>> {
        let materials = self.material_repo.get_all()?;
        let inventories = self.material_inventory_repo.get_all()?;

        let mut by_name: BTreeMap<String, f64> = BTreeMap::new();
        for material in &materials {
            let available = inventories
                .iter()
                .find(|inv| inv.material_id == material.id)
                .map(|inv| inv.available_quantity_kg)
                .unwrap_or(0.0);
            by_name.insert(material.name.clone(), available);
        }

        Ok(ServiceResponse::success(
            by_name,
            "Material inventory retrieved",
            self.clock.now().ok(),
        ))
    }
}
