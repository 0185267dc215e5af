// ==========================================
// 回收公司模拟系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供建库脚本（init_schema），所有表结构集中在此
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存数据库（测试用）并应用统一配置
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库表结构（幂等）
///
/// 约定：
/// - 所有实体使用代理整型主键
/// - 库存数量列带 CHECK(>= 0)，负库存在数据库层直接拒绝
/// - order_status 为枚举表，建库时播种固定状态
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS company (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS raw_material (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL UNIQUE COLLATE NOCASE,
            price_per_kg REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS material_inventory (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            material_id           INTEGER NOT NULL UNIQUE REFERENCES raw_material(id),
            available_quantity_kg REAL NOT NULL DEFAULT 0 CHECK (available_quantity_kg >= 0),
            reserved_quantity_kg  REAL NOT NULL DEFAULT 0 CHECK (reserved_quantity_kg >= 0)
        );

        CREATE TABLE IF NOT EXISTS order_status (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS orders (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            order_number    TEXT NOT NULL UNIQUE,
            company_id      INTEGER NOT NULL REFERENCES company(id),
            order_status_id INTEGER NOT NULL REFERENCES order_status(id),
            created_at      TEXT NOT NULL,
            expires_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS order_item (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id     INTEGER NOT NULL REFERENCES orders(id),
            material_id  INTEGER NOT NULL REFERENCES raw_material(id),
            quantity_kg  REAL NOT NULL,
            price_per_kg REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS phone (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS phone_inventory (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_id INTEGER NOT NULL UNIQUE REFERENCES phone(id),
            quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0)
        );

        CREATE TABLE IF NOT EXISTS machine (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            is_operational INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS phone_part (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS phone_part_ratio (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_id        INTEGER NOT NULL REFERENCES phone(id),
            phone_part_id   INTEGER NOT NULL REFERENCES phone_part(id),
            parts_per_phone REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS part_material_ratio (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_part_id     INTEGER NOT NULL REFERENCES phone_part(id),
            material_id       INTEGER NOT NULL REFERENCES raw_material(id),
            material_per_part REAL NOT NULL
        );

        INSERT OR IGNORE INTO order_status (name) VALUES ('Pending'), ('Approved'), ('Expired');
        "#,
    )?;

    Ok(())
}
