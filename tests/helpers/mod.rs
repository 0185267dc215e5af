// ==========================================
// 集成测试公共辅助
// ==========================================
// 约定: 每个测试使用独立内存库，时钟在装配后立即启动
#![allow(dead_code)]

use recycler_sim::app::AppState;
use recycler_sim::config::SimConfig;
use recycler_sim::db;
use recycler_sim::repository::phone_repo::{PhoneInventoryRepository, PhoneRepository};
use recycler_sim::repository::{MaterialInventoryRepository, RawMaterialRepository};

/// 构造内存库上的完整应用状态（默认配置，时钟已启动）
pub fn test_state() -> AppState {
    test_state_with(&SimConfig::default())
}

/// 构造内存库上的完整应用状态（指定配置，时钟已启动）
pub fn test_state_with(config: &SimConfig) -> AppState {
    let conn = db::open_in_memory_connection().unwrap();
    db::init_schema(&conn).unwrap();
    let state = AppState::from_connection(conn, config);
    state.clock.start(None);
    state
}

/// 播种公司
pub fn seed_company(state: &AppState, name: &str) -> i64 {
    state.company_repo.create(name).unwrap()
}

/// 播种原材料及其库存行
pub fn seed_material(state: &AppState, name: &str, price_per_kg: f64, available_kg: f64) -> i64 {
    let materials = RawMaterialRepository::from_connection(state.conn.clone());
    let inventories = MaterialInventoryRepository::from_connection(state.conn.clone());
    let material_id = materials.create(name, price_per_kg).unwrap();
    inventories.create(material_id, available_kg).unwrap();
    material_id
}

/// 播种手机型号及其库存
pub fn seed_phone(state: &AppState, brand: &str, model: &str, quantity: i64) -> i64 {
    let phones = PhoneRepository::from_connection(state.conn.clone());
    let inventory = PhoneInventoryRepository::from_connection(state.conn.clone());
    let phone_id = phones.create(brand, model).unwrap();
    inventory.add_quantity(phone_id, quantity).unwrap();
    phone_id
}

/// 播种单条完整配比链: 手机 →(parts_per_phone)→ 部件 →(material_per_part)→ 材料
pub fn seed_yield_chain(
    state: &AppState,
    phone_id: i64,
    part_name: &str,
    parts_per_phone: f64,
    material_id: i64,
    material_per_part: f64,
) {
    let part_id = state.ratio_repo.create_part(part_name).unwrap();
    state
        .ratio_repo
        .create_phone_part_ratio(phone_id, part_id, parts_per_phone)
        .unwrap();
    state
        .ratio_repo
        .create_part_material_ratio(part_id, material_id, material_per_part)
        .unwrap();
}

/// 读取材料当前 (可用, 预留) 数量
pub fn material_quantities(state: &AppState, material_id: i64) -> (f64, f64) {
    let inventories = MaterialInventoryRepository::from_connection(state.conn.clone());
    let inv = inventories.find_by_material_id(material_id).unwrap().unwrap();
    (inv.available_quantity_kg, inv.reserved_quantity_kg)
}

/// 读取手机当前库存数量（无行视为 0）
pub fn phone_quantity(state: &AppState, phone_id: i64) -> i64 {
    let inventory = PhoneInventoryRepository::from_connection(state.conn.clone());
    inventory
        .find_by_phone_id(phone_id)
        .unwrap()
        .map(|row| row.quantity)
        .unwrap_or(0)
}
