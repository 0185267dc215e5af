// ==========================================
// 回收公司模拟系统 - 原材料 API
// ==========================================
// 职责: 材料行情查询与价格更新（外部行情方推送入口）
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiResult;
use crate::domain::{RawMaterialPrice, ServiceResponse};
use crate::engine::clock::SimulationClock;
use crate::repository::{MaterialInventoryRepository, RawMaterialRepository, RepositoryError};

// ==========================================
// DTO 定义
// ==========================================

/// 单条价格更新
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateDto {
    pub material_name: String,
    pub price_per_kg: f64,
}

/// 批量价格更新请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePricesRequest {
    pub prices: Vec<PriceUpdateDto>,
}

/// 批量价格更新结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePricesResult {
    pub updated: usize,
    pub created: usize,
}

// ==========================================
// MaterialApi
// ==========================================

/// 原材料API
pub struct MaterialApi {
    conn: Arc<Mutex<Connection>>,
    material_repo: Arc<RawMaterialRepository>,
    material_inventory_repo: Arc<MaterialInventoryRepository>,
    clock: Arc<SimulationClock>,
}

impl MaterialApi {
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        material_repo: Arc<RawMaterialRepository>,
        material_inventory_repo: Arc<MaterialInventoryRepository>,
        clock: Arc<SimulationClock>,
    ) -> Self {
        Self {
            conn,
            material_repo,
            material_inventory_repo,
            clock,
        }
    }

    /// 查询材料行情（名称 + 单价 + 当前可用库存）
    pub fn list_materials_with_stock(&self) -> ApiResult<ServiceResponse<Vec<RawMaterialPrice>>> {
        let materials = self.material_repo.get_all()?;
        let inventories = self.material_inventory_repo.get_all()?;

        let views: Vec<RawMaterialPrice> = materials
            .into_iter()
            .map(|m| {
                let available = inventories
                    .iter()
                    .find(|inv| inv.material_id == m.id)
                    .map(|inv| inv.available_quantity_kg)
                    .unwrap_or(0.0);
                RawMaterialPrice {
                    name: m.name,
                    price_per_kg: m.price_per_kg,
                    available_quantity_kg: available,
                }
            })
            .collect();

        Ok(ServiceResponse::success(
            views,
            "Materials retrieved",
            self.clock.now().ok(),
        ))
    }

    /// 批量更新价格（不存在的材料按零库存新建）
    ///
    /// 整批一个事务：任何一条价格非正即整批拒绝，
    /// 任何一条持久化失败即整批回滚，不做部分应用
    #[instrument(skip(self, request), fields(count = request.prices.len()))]
    pub fn update_prices(
        &self,
        request: &UpdatePricesRequest,
    ) -> ApiResult<ServiceResponse<UpdatePricesResult>> {
        if request.prices.is_empty() {
            return Ok(ServiceResponse::failure(
                "Price update must contain at least one material.",
                self.clock.now().ok(),
            ));
        }
        if let Some(bad) = request.prices.iter().find(|p| p.price_per_kg <= 0.0) {
            return Ok(ServiceResponse::failure(
                format!("Price for {} must be greater than zero.", bad.material_name),
                self.clock.now().ok(),
            ));
        }

        let mut guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        let mut updated = 0usize;
        let mut created = 0usize;
        for update in &request.prices {
            match RawMaterialRepository::find_by_name_in(&tx, &update.material_name)? {
                Some(material) => {
                    RawMaterialRepository::update_price_in(&tx, material.id, update.price_per_kg)?;
                    updated += 1;
                }
                None => {
                    let material_id =
                        RawMaterialRepository::create_in(&tx, &update.material_name, update.price_per_kg)?;
                    MaterialInventoryRepository::add_available_in(&tx, material_id, 0.0)?;
                    created += 1;
                }
            }
        }

        tx.commit().map_err(RepositoryError::from)?;
        info!(updated, created, "材料价格更新完成");

        Ok(ServiceResponse::success(
            UpdatePricesResult { updated, created },
            "Prices updated",
            self.clock.now().ok(),
        ))
    }
}
