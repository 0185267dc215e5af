// ==========================================
// 订单预留 全有或全无 集成测试
// ==========================================

mod helpers;

use helpers::*;
use recycler_sim::api::order_api::{CreateOrderRequest, OrderItemDto};
use recycler_sim::config::SimConfig;

fn order_request(company: &str, items: &[(&str, f64)]) -> CreateOrderRequest {
    CreateOrderRequest {
        company_name: company.to_string(),
        order_items: items
            .iter()
            .map(|(name, qty)| OrderItemDto {
                material_name: name.to_string(),
                quantity_kg: *qty,
            })
            .collect(),
    }
}

#[test]
fn test_successful_order_reserves_stock() {
    let state = test_state();
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 5000.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1000.0)]))
        .unwrap();

    assert!(response.is_success);
    assert_eq!(response.message, "Successfully created new order");

    let order = response.data.unwrap();
    assert_eq!(order.status.name, "Pending");
    assert_eq!(order.order_items.len(), 1);
    assert_eq!(order.order_items[0].quantity_kg, 1000.0);
    // 价格为预留当时的快照
    assert_eq!(order.order_items[0].price_per_kg, 5.0);

    let (available, reserved) = material_quantities(&state, copper);
    assert_eq!(available, 4000.0);
    assert_eq!(reserved, 1000.0);
}

#[test]
fn test_insufficient_stock_rejects_entire_order() {
    let state = test_state();
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 500.0);
    let gold = seed_material(&state, "Gold", 50.0, 100.0);

    // Gold 本身可满足，但 Copper 缺货 → 整单失败
    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1000.0), ("Gold", 50.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert!(response.message.contains("We do not have sufficient stock"));
    assert!(response.message.contains("Copper"));
    assert!(!response.message.contains("Gold"));
    assert!(response.data.is_none());

    // 任何一项失败即不得有任何库存变动
    assert_eq!(material_quantities(&state, copper), (500.0, 0.0));
    assert_eq!(material_quantities(&state, gold), (100.0, 0.0));
}

#[test]
fn test_duplicate_material_lines_checked_against_combined_demand() {
    let state = test_state();
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 500.0);

    // 每行单独可满足，但两行合计 600kg 超出 500kg 可用量 → 整单缺货拒绝
    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 300.0), ("Copper", 300.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert!(response.message.contains("We do not have sufficient stock"));
    assert!(response.message.contains("Copper"));
    assert_eq!(material_quantities(&state, copper), (500.0, 0.0));
}

#[test]
fn test_duplicate_material_lines_within_stock_both_reserved() {
    let state = test_state();
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 500.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 200.0), ("Copper", 200.0)]))
        .unwrap();

    assert!(response.is_success);
    assert_eq!(response.data.unwrap().order_items.len(), 2);
    assert_eq!(material_quantities(&state, copper), (100.0, 400.0));
}

#[test]
fn test_unknown_company_is_rejected() {
    let state = test_state();
    seed_material(&state, "Copper", 5.0, 5000.0);

    let response = state
        .order_api
        .create_order(&order_request("Nonexistent", &[("Copper", 100.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert_eq!(response.message, "Company Nonexistent does not exist");
}

#[test]
fn test_unknown_material_listed_as_unavailable() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 5000.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Unobtanium", 10.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert!(response.message.contains("Unobtanium"));
}

#[test]
fn test_empty_inventory_short_circuit_lists_all_items() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 0.0);
    seed_material(&state, "Gold", 50.0, 0.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 10.0), ("Gold", 5.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert!(response.message.contains("Copper"));
    assert!(response.message.contains("Gold"));
}

#[test]
fn test_empty_order_is_rejected() {
    let state = test_state();
    seed_company(&state, "Acme");

    let response = state.order_api.create_order(&order_request("Acme", &[])).unwrap();

    assert!(!response.is_success);
    assert_eq!(response.message, "Order must contain at least one item.");
}

#[test]
fn test_zero_quantity_is_rejected() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 5000.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 0.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert!(response.message.contains("greater than zero"));
}

#[test]
fn test_quantity_step_constraint_when_enabled() {
    let config = SimConfig {
        order_quantity_step_kg: Some(1000.0),
        ..SimConfig::default()
    };
    let state = test_state_with(&config);
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 5000.0);

    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1500.0)]))
        .unwrap();

    assert!(!response.is_success);
    assert_eq!(
        response.message,
        "Can only order raw materials in multiples of 1000 kg."
    );
    assert_eq!(material_quantities(&state, copper), (5000.0, 0.0));

    // 整倍数订单正常通过
    let response = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 2000.0)]))
        .unwrap();
    assert!(response.is_success);
    assert_eq!(material_quantities(&state, copper), (3000.0, 2000.0));
}

#[test]
fn test_order_lookup_by_number() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 5000.0);

    let created = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1000.0)]))
        .unwrap()
        .data
        .unwrap();

    let fetched = state
        .order_api
        .get_order_by_number(&created.order_number.to_string())
        .unwrap()
        .data
        .unwrap();

    assert_eq!(fetched.order_id, created.order_id);
    assert_eq!(fetched.order_number, created.order_number);
    assert_eq!(fetched.order_items.len(), 1);
    assert_eq!(fetched.order_items[0].material_name, "Copper");
}

#[test]
fn test_confirm_payment_approves_pending_order() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 5000.0);

    let created = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1000.0)]))
        .unwrap()
        .data
        .unwrap();
    let order_number = created.order_number.to_string();

    let response = state.order_api.confirm_payment(&order_number).unwrap();
    assert!(response.is_success);
    assert_eq!(response.data.unwrap().status.name, "Approved");

    // 重复付款确认被拒绝
    let response = state.order_api.confirm_payment(&order_number).unwrap();
    assert!(!response.is_success);
    assert_eq!(response.message, "Order has already been paid");
}

#[test]
fn test_order_timestamps_use_simulation_time() {
    let state = test_state();
    seed_company(&state, "Acme");
    seed_material(&state, "Copper", 5.0, 5000.0);

    let order = state
        .order_api
        .create_order(&order_request("Acme", &[("Copper", 1000.0)]))
        .unwrap()
        .data
        .unwrap();

    // 时钟刚锚定，创建时间应位于 2050 纪元附近
    assert_eq!(order.created_at.format("%Y").to_string(), "2050");
    assert_eq!(order.expires_at - order.created_at, chrono::Duration::days(7));
}
