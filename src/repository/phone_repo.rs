// ==========================================
// 回收公司模拟系统 - 手机仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::{Phone, PhoneInventory};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// PhoneRepository - 手机型号仓储
// ==========================================

/// 手机型号仓储
pub struct PhoneRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PhoneRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 ID 查询手机型号
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Phone>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    /// 按 ID 查询手机型号（事务内调用面）
    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<Phone>> {
        let phone = conn
            .query_row(
                "SELECT id, brand, model FROM phone WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Phone {
                        id: row.get(0)?,
                        brand: row.get(1)?,
                        model: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(phone)
    }

    /// 创建手机型号
    pub fn create(&self, brand: &str, model: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO phone (brand, model) VALUES (?1, ?2)",
            params![brand, model],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

// ==========================================
// PhoneInventoryRepository - 手机库存仓储
// ==========================================

/// 带型号信息的库存行（回收分配引擎的输入）
#[derive(Debug, Clone)]
pub struct PhoneInventoryRow {
    pub phone_id: i64,
    pub brand: String,
    pub model: String,
    pub quantity: i64,
}

/// 手机库存仓储
pub struct PhoneInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PhoneInventoryRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询有库存的型号，按数量降序（最大组优先的贪心输入顺序）
    pub fn find_available_desc(&self) -> RepositoryResult<Vec<PhoneInventoryRow>> {
        let conn = self.get_conn()?;
        Self::find_available_desc_in(&conn)
    }

    /// 查询有库存的型号，按数量降序（事务内调用面）
    pub fn find_available_desc_in(conn: &Connection) -> RepositoryResult<Vec<PhoneInventoryRow>> {
        let mut stmt = conn.prepare(
            "SELECT pi.phone_id, p.brand, p.model, pi.quantity
             FROM phone_inventory pi
             JOIN phone p ON p.id = pi.phone_id
             WHERE pi.quantity > 0
             ORDER BY pi.quantity DESC, pi.phone_id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PhoneInventoryRow {
                    phone_id: row.get(0)?,
                    brand: row.get(1)?,
                    model: row.get(2)?,
                    quantity: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<PhoneInventoryRow>>>()?;

        Ok(rows)
    }

    /// 按手机 ID 查询库存行
    pub fn find_by_phone_id(&self, phone_id: i64) -> RepositoryResult<Option<PhoneInventory>> {
        let conn = self.get_conn()?;
        let inventory = conn
            .query_row(
                "SELECT id, phone_id, quantity FROM phone_inventory WHERE phone_id = ?1",
                params![phone_id],
                |row| {
                    Ok(PhoneInventory {
                        id: row.get(0)?,
                        phone_id: row.get(1)?,
                        quantity: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(inventory)
    }

    /// 手机库存总量
    pub fn total_available(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM phone_inventory",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 扣减库存（事务内调用面，写穿式，不延迟）
    ///
    /// 超扣由 CHECK 约束兜底拒绝
    pub fn decrement_in(conn: &Connection, phone_id: i64, quantity: i64) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE phone_inventory SET quantity = quantity - ?1 WHERE phone_id = ?2",
            params![quantity, phone_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "PhoneInventory".to_string(),
                id: phone_id.to_string(),
            });
        }
        Ok(())
    }

    /// 增加库存，行不存在时新建（外部收货入库用）
    pub fn add_quantity(&self, phone_id: i64, quantity: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO phone_inventory (phone_id, quantity)
             VALUES (?1, ?2)
             ON CONFLICT (phone_id)
             DO UPDATE SET quantity = quantity + ?2",
            params![phone_id, quantity],
        )?;
        Ok(())
    }

    /// 清零全部手机库存（模拟重置用）
    pub fn reset_all_in(conn: &Connection) -> RepositoryResult<()> {
        conn.execute("UPDATE phone_inventory SET quantity = 0", [])?;
        Ok(())
    }
}
