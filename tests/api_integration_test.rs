// ==========================================
// API 层端到端集成测试
// ==========================================

mod helpers;

use helpers::*;
use recycler_sim::api::material_api::{PriceUpdateDto, UpdatePricesRequest};
use recycler_sim::api::order_api::{CreateOrderRequest, OrderItemDto};
use recycler_sim::api::recycling_api::ReceivePhonesRequest;
use recycler_sim::api::ApiError;

#[test]
fn test_estimate_yield_is_read_only() {
    let state = test_state();
    let copper = seed_material(&state, "Copper", 5.0, 0.0);
    let gold = seed_material(&state, "Gold", 50.0, 0.0);
    let phone = seed_phone(&state, "Samsung", "Galaxy", 8);
    seed_yield_chain(&state, phone, "Circuit Board", 2.0, copper, 0.5);
    seed_yield_chain(&state, phone, "Connector", 4.0, gold, 0.01);

    let response = state.recycling_api.estimate_yield(phone, 100).unwrap();
    assert!(response.is_success);

    let estimate = response.data.unwrap();
    assert_eq!(estimate.brand, "Samsung");
    assert_eq!(estimate.phone_model, "Galaxy");
    // 100 台 × 2 × 0.5 = 100kg 铜; 100 台 × 4 × 0.01 = 4kg 金
    assert_eq!(estimate.estimated_materials.get("Copper"), Some(&100.0));
    assert_eq!(estimate.estimated_materials.get("Gold"), Some(&4.0));
    assert_eq!(estimate.total_estimated_kg, 104.0);

    // 估算不触碰任何库存
    assert_eq!(phone_quantity(&state, phone), 8);
    assert_eq!(material_quantities(&state, copper), (0.0, 0.0));
}

#[test]
fn test_estimate_yield_unknown_phone_is_not_found() {
    let state = test_state();

    let err = state.recycling_api.estimate_yield(999, 10).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_estimate_yield_rejects_non_positive_quantity() {
    let state = test_state();
    let phone = seed_phone(&state, "Nokia", "3310", 1);

    let response = state.recycling_api.estimate_yield(phone, 0).unwrap();
    assert!(!response.is_success);
    assert!(response.message.contains("greater than zero"));
}

#[test]
fn test_material_inventory_map_includes_zero_stock_rows() {
    let state = test_state();
    seed_material(&state, "Copper", 5.0, 120.0);
    seed_material(&state, "Gold", 50.0, 0.0);

    let response = state.recycling_api.get_material_inventory().unwrap();
    let map = response.data.unwrap();

    assert_eq!(map.get("Copper"), Some(&120.0));
    assert_eq!(map.get("Gold"), Some(&0.0));
    // BTreeMap 按名称字典序
    let names: Vec<&String> = map.keys().collect();
    assert_eq!(names, vec!["Copper", "Gold"]);
}

#[test]
fn test_receive_phones_accumulates_inventory() {
    let state = test_state();
    let phone = seed_phone(&state, "Nokia", "3310", 2);

    let response = state
        .recycling_api
        .receive_phones(&ReceivePhonesRequest { phone_id: phone, quantity: 5 })
        .unwrap();

    assert!(response.is_success);
    assert_eq!(response.data.unwrap().quantity, 7);
    assert_eq!(phone_quantity(&state, phone), 7);

    let response = state
        .recycling_api
        .receive_phones(&ReceivePhonesRequest { phone_id: phone, quantity: 0 })
        .unwrap();
    assert!(!response.is_success);
    assert_eq!(phone_quantity(&state, phone), 7);
}

#[test]
fn test_available_phones_sorted_by_quantity_desc() {
    let state = test_state();
    seed_phone(&state, "Nokia", "3310", 3);
    seed_phone(&state, "Samsung", "Galaxy", 9);
    let empty = seed_phone(&state, "Sony", "Xperia", 1);
    // 清零的型号不应出现
    let inv = recycler_sim::repository::phone_repo::PhoneInventoryRepository::from_connection(
        state.conn.clone(),
    );
    inv.add_quantity(empty, -1).unwrap();

    let phones = state.recycling_api.get_available_phones().unwrap().data.unwrap();
    assert_eq!(phones.len(), 2);
    assert_eq!(phones[0].model, "Galaxy");
    assert_eq!(phones[1].model, "3310");
}

#[test]
fn test_update_prices_updates_and_creates() {
    let state = test_state();
    seed_material(&state, "Copper", 5.0, 100.0);

    let request = UpdatePricesRequest {
        prices: vec![
            PriceUpdateDto { material_name: "Copper".to_string(), price_per_kg: 6.5 },
            PriceUpdateDto { material_name: "Lithium".to_string(), price_per_kg: 80.0 },
        ],
    };
    let response = state.material_api.update_prices(&request).unwrap();
    assert!(response.is_success);
    let result = response.data.unwrap();
    assert_eq!(result.updated, 1);
    assert_eq!(result.created, 1);

    let materials = state.material_api.list_materials_with_stock().unwrap().data.unwrap();
    let copper = materials.iter().find(|m| m.name == "Copper").unwrap();
    assert_eq!(copper.price_per_kg, 6.5);
    assert_eq!(copper.available_quantity_kg, 100.0);
    let lithium = materials.iter().find(|m| m.name == "Lithium").unwrap();
    assert_eq!(lithium.price_per_kg, 80.0);
    assert_eq!(lithium.available_quantity_kg, 0.0);
}

#[test]
fn test_update_prices_batch_is_atomic_over_one_transaction() {
    let state = test_state();

    // 同一批内名称大小写不同的两条：第一条新建后，
    // 第二条必须在同一事务内看到该行并走更新分支（而非撞唯一约束）
    let request = UpdatePricesRequest {
        prices: vec![
            PriceUpdateDto { material_name: "Lithium".to_string(), price_per_kg: 80.0 },
            PriceUpdateDto { material_name: "lithium".to_string(), price_per_kg: 90.0 },
        ],
    };
    let response = state.material_api.update_prices(&request).unwrap();
    assert!(response.is_success);
    let result = response.data.unwrap();
    assert_eq!(result.created, 1);
    assert_eq!(result.updated, 1);

    let materials = state.material_api.list_materials_with_stock().unwrap().data.unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].price_per_kg, 90.0);
}

#[test]
fn test_update_prices_rejects_non_positive_price_wholesale() {
    let state = test_state();
    seed_material(&state, "Copper", 5.0, 100.0);

    let request = UpdatePricesRequest {
        prices: vec![
            PriceUpdateDto { material_name: "Copper".to_string(), price_per_kg: 9.0 },
            PriceUpdateDto { material_name: "Gold".to_string(), price_per_kg: -1.0 },
        ],
    };
    let response = state.material_api.update_prices(&request).unwrap();
    assert!(!response.is_success);
    assert!(response.message.contains("Gold"));

    // 整批拒绝：合法的那条也不得应用
    let materials = state.material_api.list_materials_with_stock().unwrap().data.unwrap();
    assert_eq!(materials.iter().find(|m| m.name == "Copper").unwrap().price_per_kg, 5.0);
}

#[test]
fn test_machine_summary_counts() {
    let state = test_state();
    state.machine_api.register_machines(3).unwrap();
    state.machine_api.report_failure(1).unwrap();

    let summary = state.machine_api.get_machines().unwrap().data.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.operational, 2);
}

#[test]
fn test_start_simulation_resets_state() {
    let state = test_state();
    seed_company(&state, "Acme");
    let copper = seed_material(&state, "Copper", 5.0, 5000.0);
    let phone = seed_phone(&state, "Nokia", "3310", 10);

    let request = CreateOrderRequest {
        company_name: "Acme".to_string(),
        order_items: vec![OrderItemDto {
            material_name: "Copper".to_string(),
            quantity_kg: 1000.0,
        }],
    };
    let order = state.order_api.create_order(&request).unwrap().data.unwrap();

    let response = state.simulation_api.start_simulation(None).unwrap();
    assert!(response.is_success);

    // 订单删除、库存清零、时钟回到纪元
    let err = state.order_api.get_order_by_id(order.order_id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(material_quantities(&state, copper), (0.0, 0.0));
    assert_eq!(phone_quantity(&state, phone), 0);

    let status = state.simulation_api.current_time().unwrap().data.unwrap();
    assert!(status.started);
    let sim_time = status.simulation_time.unwrap();
    assert!((sim_time - status.epoch) < chrono::Duration::seconds(5));
}

#[test]
fn test_envelope_carries_simulation_timestamp() {
    let state = test_state();
    seed_material(&state, "Copper", 5.0, 10.0);

    let response = state.material_api.list_materials_with_stock().unwrap();
    assert!(response.is_success);
    let ts = response.timestamp.unwrap();
    assert_eq!(ts.format("%Y").to_string(), "2050");
}
