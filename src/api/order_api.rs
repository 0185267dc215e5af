// ==========================================
// 回收公司模拟系统 - 订单 API
// ==========================================
// 职责: 对外暴露订单创建/查询/付款确认，统一封套返回
// 说明: 业务性拒绝（缺货、公司不存在）走 is_success=false 封套，
//       基础设施失败走 ApiError
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{Order, OrderItemView, OrderView, ServiceResponse};
use crate::engine::clock::SimulationClock;
use crate::engine::reservation::{OrderItemRequest, OrderReservationEngine};
use crate::repository::{
    OrderItemRepository, OrderRepository, OrderStatusRepository, RawMaterialRepository,
};

// ==========================================
// DTO 定义
// ==========================================

/// 创建订单请求项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDto {
    pub material_name: String,
    pub quantity_kg: f64,
}

/// 创建订单请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub company_name: String,
    pub order_items: Vec<OrderItemDto>,
}

// ==========================================
// OrderApi
// ==========================================

/// 订单API
pub struct OrderApi {
    reservation_engine: Arc<OrderReservationEngine>,
    order_repo: Arc<OrderRepository>,
    order_item_repo: Arc<OrderItemRepository>,
    order_status_repo: Arc<OrderStatusRepository>,
    material_repo: Arc<RawMaterialRepository>,
    clock: Arc<SimulationClock>,
}

impl OrderApi {
    pub fn new(
        reservation_engine: Arc<OrderReservationEngine>,
        order_repo: Arc<OrderRepository>,
        order_item_repo: Arc<OrderItemRepository>,
        order_status_repo: Arc<OrderStatusRepository>,
        material_repo: Arc<RawMaterialRepository>,
        clock: Arc<SimulationClock>,
    ) -> Self {
        Self {
            reservation_engine,
            order_repo,
            order_item_repo,
            order_status_repo,
            material_repo,
            clock,
        }
    }

    /// 创建订单（全有或全无预留）
    #[instrument(skip(self, request), fields(company = %request.company_name))]
    pub fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> ApiResult<ServiceResponse<OrderView>> {
        let items: Vec<OrderItemRequest> = request
            .order_items
            .iter()
            .map(|i| OrderItemRequest {
                material_name: i.material_name.clone(),
                quantity_kg: i.quantity_kg,
            })
            .collect();

        let result = self
            .reservation_engine
            .create_order(&request.company_name, &items)?;
        let timestamp = self.clock.now().ok();

        if result.success {
            match result.order {
                Some(order) => Ok(ServiceResponse::success(order, result.message, timestamp)),
                // 引擎承诺成功结果必带订单视图
                None => Err(ApiError::InternalError(
                    "reservation succeeded without an order view".to_string(),
                )),
            }
        } else {
            Ok(ServiceResponse::failure(result.message, timestamp))
        }
    }

    /// 按内部ID查询订单
    pub fn get_order_by_id(&self, order_id: i64) -> ApiResult<ServiceResponse<OrderView>> {
        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::NotFound(format!("order with id {}", order_id)))?;
        let view = self.build_order_view(order)?;
        Ok(ServiceResponse::success(
            view,
            "Order found",
            self.clock.now().ok(),
        ))
    }

    /// 按订单号（UUID）查询订单
    pub fn get_order_by_number(&self, order_number: &str) -> ApiResult<ServiceResponse<OrderView>> {
        let order = self
            .order_repo
            .find_by_order_number(order_number)?
            .ok_or_else(|| ApiError::NotFound(format!("order {}", order_number)))?;
        let view = self.build_order_view(order)?;
        Ok(ServiceResponse::success(
            view,
            "Order found",
            self.clock.now().ok(),
        ))
    }

    /// 确认付款：Pending 订单转为 Approved
    ///
    /// 拒绝条件（均走 is_success=false 封套）：
    /// - 订单已批准（重复付款）
    /// - 当前模拟时间已超过订单过期时间
    #[instrument(skip(self))]
    pub fn confirm_payment(&self, order_number: &str) -> ApiResult<ServiceResponse<OrderView>> {
        let order = self
            .order_repo
            .find_by_order_number(order_number)?
            .ok_or_else(|| ApiError::NotFound(format!("order {}", order_number)))?;

        let now = self.clock.now()?;

        let approved = self
            .order_status_repo
            .find_by_name("Approved")?
            .ok_or_else(|| ApiError::InternalError("order status Approved missing".to_string()))?;

        if order.order_status_id == approved.id {
            return Ok(ServiceResponse::failure(
                "Order has already been paid",
                Some(now),
            ));
        }
        if now > order.expires_at {
            return Ok(ServiceResponse::failure("Order has expired", Some(now)));
        }

        self.order_repo.update_status(order.id, approved.id)?;
        info!(order_number = %order.order_number, "订单付款确认完成");

        let updated = Order {
            order_status_id: approved.id,
            ..order
        };
        let view = self.build_order_view(updated)?;
        Ok(ServiceResponse::success(
            view,
            "Payment confirmed, order approved",
            Some(now),
        ))
    }

    /// 组装订单完整视图（状态 + 订单项 + 材料名称）
    fn build_order_view(&self, order: Order) -> ApiResult<OrderView> {
        let status = self
            .order_status_repo
            .find_by_id(order.order_status_id)?
            .ok_or_else(|| {
                ApiError::InternalError(format!("order status {} missing", order.order_status_id))
            })?;

        let items = self.order_item_repo.find_by_order_id(order.id)?;
        let mut item_views = Vec::with_capacity(items.len());
        for item in items {
            let material_name = self
                .material_repo
                .find_by_id(item.material_id)?
                .map(|m| m.name)
                .unwrap_or_default();
            item_views.push(OrderItemView {
                material_id: item.material_id,
                material_name,
                quantity_kg: item.quantity_kg,
                price_per_kg: item.price_per_kg,
            });
        }

        Ok(OrderView {
            order_id: order.id,
            order_number: order.order_number,
            company_id: order.company_id,
            status,
            created_at: order.created_at,
            expires_at: order.expires_at,
            order_items: item_views,
        })
    }
}
