// ==========================================
// 回收公司模拟系统 - 订单预留引擎
// ==========================================
// 职责: 对进货订单做全有或全无的材料预留
// 规则:
// 1) 任一请求项不可满足 → 整单失败，已暂存的预留一条也不提交
// 2) 预留 = available 减、reserved 等量增，同一事务内完成
// 3) 资源不足/对象不存在是普通失败结果，不是异常
// ==========================================

use crate::domain::{MaterialInventory, OrderItemView, OrderView, RawMaterial};
use crate::engine::clock::SimulationClock;
use crate::engine::EngineResult;
use crate::repository::{
    CompanyRepository, MaterialInventoryRepository, OrderItemRepository, OrderRepository,
    OrderStatusRepository, RawMaterialRepository, RepositoryError,
};
use chrono::Duration;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 订单请求项
#[derive(Debug, Clone)]
pub struct OrderItemRequest {
    pub material_name: String,
    pub quantity_kg: f64,
}

/// 预留结果
///
/// success=false 时 order 为 None，message 给出具体原因
#[derive(Debug, Clone)]
pub struct ReservationResult {
    pub success: bool,
    pub message: String,
    pub order: Option<OrderView>,
}

impl ReservationResult {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            order: None,
        }
    }
}

// ==========================================
// OrderReservationEngine - 订单预留引擎
// ==========================================

/// 订单预留引擎
pub struct OrderReservationEngine {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<SimulationClock>,
    /// 订单过期偏移（模拟天）
    order_expiry_days: i64,
    /// 订单数量粒度约束（None 表示不启用）
    order_quantity_step_kg: Option<f64>,
}

impl OrderReservationEngine {
    /// 创建预留引擎实例
    ///
    /// # 参数
    /// - conn: 共享数据库连接
    /// - clock: 模拟时钟（订单创建/过期时间戳来源）
    /// - order_expiry_days: 过期偏移（模拟天）
    /// - order_quantity_step_kg: 可选的数量粒度约束
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        clock: Arc<SimulationClock>,
        order_expiry_days: i64,
        order_quantity_step_kg: Option<f64>,
    ) -> Self {
        Self {
            conn,
            clock,
            order_expiry_days,
            order_quantity_step_kg,
        }
    }

    /// 创建订单（全有或全无预留）
    ///
    /// 流程（步骤 2~6 位于同一 IMMEDIATE 事务内）：
    /// 1. 按名称解析公司
    /// 2. 读取全库可用量快照
    /// 3. 快照为零 → 所有请求项直接判不可满足（空库短路）
    /// 4. 逐项解析材料与库存行并检查可用量
    /// 5. 存在不可满足项 → 整单失败，报出全部缺货材料名
    /// 6. 全部可满足 → 创建订单 + 逐项预留 + 写订单项
    ///
    /// # 返回
    /// - Ok(ReservationResult): 业务结果（成功或带原因的失败）
    /// - Err(EngineError): 时钟未启动 / 持久层失败（事务已回滚）
    #[instrument(skip(self, items), fields(company = %company_name, item_count = items.len()))]
    pub fn create_order(
        &self,
        company_name: &str,
        items: &[OrderItemRequest],
    ) -> EngineResult<ReservationResult> {
        // 前置校验：业务性失败，直接返回结果值
        if items.is_empty() {
            return Ok(ReservationResult::rejected("Order must contain at least one item."));
        }
        for item in items {
            if item.quantity_kg <= 0.0 {
                return Ok(ReservationResult::rejected(format!(
                    "Quantity for {} must be greater than zero.",
                    item.material_name
                )));
            }
        }
        if let Some(step) = self.order_quantity_step_kg {
            if items.iter().any(|i| (i.quantity_kg % step).abs() > f64::EPSILON) {
                return Ok(ReservationResult::rejected(format!(
                    "Can only order raw materials in multiples of {} kg.",
                    step
                )));
            }
        }

        let mut guard = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        // 1. 解析公司（事务开始前即可失败返回）
        let company = match CompanyRepository::find_by_name_in(&guard, company_name)? {
            Some(company) => company,
            None => {
                warn!(company = %company_name, "下单公司不存在");
                return Ok(ReservationResult::rejected(format!(
                    "Company {} does not exist",
                    company_name
                )));
            }
        };

        // 订单时间戳取自模拟时钟；时钟未启动属配置错误，直接向上传播
        let created_at = self.clock.now()?;
        let expires_at = created_at + Duration::days(self.order_expiry_days);

        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::from)?;

        // 2. 全库可用量快照（单次读取）
        let total_available = MaterialInventoryRepository::total_available_in(&tx)?;

        let mut unavailable: Vec<String> = Vec::new();
        let mut staged: Vec<(MaterialInventory, f64, RawMaterial)> = Vec::new();

        if total_available <= 0.0 {
            // 3. 空库短路：省去逐项查询
            unavailable = items.iter().map(|i| i.material_name.clone()).collect();
        } else {
            // 4. 逐项独立检查
            for item in items {
                let material = RawMaterialRepository::find_by_name_in(&tx, &item.material_name)?;
                let inventory = match &material {
                    Some(m) => MaterialInventoryRepository::find_by_material_id_in(&tx, m.id)?,
                    None => None,
                };

                match (material, inventory) {
                    (Some(material), Some(inventory)) => {
                        // 同一材料出现多行时，可用量须扣除本单已暂存的数量
                        let staged_so_far: f64 = staged
                            .iter()
                            .filter(|(staged_inv, _, _)| staged_inv.id == inventory.id)
                            .map(|(_, qty, _)| *qty)
                            .sum();
                        if inventory.available_quantity_kg - staged_so_far >= item.quantity_kg {
                            // 价格在预留当时快照
                            staged.push((inventory, item.quantity_kg, material));
                        } else {
                            unavailable.push(item.material_name.clone());
                        }
                    }
                    _ => unavailable.push(item.material_name.clone()),
                }
            }
        }

        // 5. 全有或全无：存在缺货项则整单失败（事务随 drop 回滚，未写任何数据）
        if !unavailable.is_empty() {
            info!(unavailable = ?unavailable, "订单因缺货整单拒绝");
            return Ok(ReservationResult::rejected(format!(
                "We do not have sufficient stock for the following materials: {}",
                unavailable.join(", ")
            )));
        }

        // 6. 创建订单并提交全部预留
        let pending = OrderStatusRepository::find_by_name_in(&tx, "Pending")?.ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "OrderStatus".to_string(),
                id: "Pending".to_string(),
            }
        })?;

        let order_number = Uuid::new_v4();
        let order_id = OrderRepository::create_in(
            &tx,
            order_number,
            company.id,
            pending.id,
            created_at,
            expires_at,
        )?;

        let mut item_views = Vec::with_capacity(staged.len());
        for (inventory, quantity_kg, material) in &staged {
            MaterialInventoryRepository::apply_reservation_in(&tx, inventory.id, *quantity_kg)?;
            OrderItemRepository::create_in(&tx, order_id, material.id, *quantity_kg, material.price_per_kg)?;

            item_views.push(OrderItemView {
                material_id: material.id,
                material_name: material.name.clone(),
                quantity_kg: *quantity_kg,
                price_per_kg: material.price_per_kg,
            });
        }

        tx.commit().map_err(RepositoryError::from)?;

        info!(order_id, %order_number, items = item_views.len(), "订单创建成功");

        Ok(ReservationResult {
            success: true,
            message: "Successfully created new order".to_string(),
            order: Some(OrderView {
                order_id,
                order_number,
                company_id: company.id,
                status: pending,
                created_at,
                expires_at,
                order_items: item_views,
            }),
        })
    }
}
