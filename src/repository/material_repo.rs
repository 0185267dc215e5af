// ==========================================
// 回收公司模拟系统 - 原材料/材料库存仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 库存行的 available/reserved 变动必须由引擎在事务内驱动
// ==========================================

use crate::domain::{MaterialInventory, RawMaterial};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// RawMaterialRepository - 原材料主数据仓储
// ==========================================

/// 原材料主数据仓储
pub struct RawMaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RawMaterialRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部原材料
    pub fn get_all(&self) -> RepositoryResult<Vec<RawMaterial>> {
        let conn = self.get_conn()?;
        Self::get_all_in(&conn)
    }

    /// 查询全部原材料（事务内调用面）
    pub fn get_all_in(conn: &Connection) -> RepositoryResult<Vec<RawMaterial>> {
        let mut stmt =
            conn.prepare("SELECT id, name, price_per_kg FROM raw_material ORDER BY name")?;

        let materials = stmt
            .query_map([], |row| {
                Ok(RawMaterial {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price_per_kg: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<RawMaterial>>>()?;

        Ok(materials)
    }

    /// 按名称查询原材料（大小写不敏感，列为 COLLATE NOCASE）
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<RawMaterial>> {
        let conn = self.get_conn()?;
        Self::find_by_name_in(&conn, name)
    }

    /// 按名称查询原材料（事务内调用面）
    pub fn find_by_name_in(conn: &Connection, name: &str) -> RepositoryResult<Option<RawMaterial>> {
        let material = conn
            .query_row(
                "SELECT id, name, price_per_kg FROM raw_material WHERE name = ?1",
                params![name],
                |row| {
                    Ok(RawMaterial {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price_per_kg: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(material)
    }

    /// 按 ID 查询原材料
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<RawMaterial>> {
        let conn = self.get_conn()?;
        Self::find_by_id_in(&conn, id)
    }

    /// 按 ID 查询原材料（事务内调用面）
    pub fn find_by_id_in(conn: &Connection, id: i64) -> RepositoryResult<Option<RawMaterial>> {
        let material = conn
            .query_row(
                "SELECT id, name, price_per_kg FROM raw_material WHERE id = ?1",
                params![id],
                |row| {
                    Ok(RawMaterial {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        price_per_kg: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(material)
    }

    /// 创建原材料
    pub fn create(&self, name: &str, price_per_kg: f64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::create_in(&conn, name, price_per_kg)
    }

    /// 创建原材料（事务内调用面）
    pub fn create_in(conn: &Connection, name: &str, price_per_kg: f64) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO raw_material (name, price_per_kg) VALUES (?1, ?2)",
            params![name, price_per_kg],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新单价
    pub fn update_price(&self, id: i64, price_per_kg: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_price_in(&conn, id, price_per_kg)
    }

    /// 更新单价（事务内调用面）
    pub fn update_price_in(conn: &Connection, id: i64, price_per_kg: f64) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE raw_material SET price_per_kg = ?1 WHERE id = ?2",
            params![price_per_kg, id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "RawMaterial".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// MaterialInventoryRepository - 材料库存仓储
// ==========================================

/// 材料库存仓储
pub struct MaterialInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialInventoryRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部库存行
    pub fn get_all(&self) -> RepositoryResult<Vec<MaterialInventory>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, material_id, available_quantity_kg, reserved_quantity_kg
             FROM material_inventory ORDER BY material_id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(MaterialInventory {
                    id: row.get(0)?,
                    material_id: row.get(1)?,
                    available_quantity_kg: row.get(2)?,
                    reserved_quantity_kg: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<MaterialInventory>>>()?;

        Ok(rows)
    }

    /// 按材料 ID 查询库存行
    pub fn find_by_material_id(&self, material_id: i64) -> RepositoryResult<Option<MaterialInventory>> {
        let conn = self.get_conn()?;
        Self::find_by_material_id_in(&conn, material_id)
    }

    /// 按材料 ID 查询库存行（事务内调用面）
    pub fn find_by_material_id_in(
        conn: &Connection,
        material_id: i64,
    ) -> RepositoryResult<Option<MaterialInventory>> {
        let inventory = conn
            .query_row(
                "SELECT id, material_id, available_quantity_kg, reserved_quantity_kg
                 FROM material_inventory WHERE material_id = ?1",
                params![material_id],
                |row| {
                    Ok(MaterialInventory {
                        id: row.get(0)?,
                        material_id: row.get(1)?,
                        available_quantity_kg: row.get(2)?,
                        reserved_quantity_kg: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(inventory)
    }

    /// 全库可用总量（空库短路判断用，单次读取）
    pub fn total_available_in(conn: &Connection) -> RepositoryResult<f64> {
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(available_quantity_kg), 0) FROM material_inventory",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 应用一笔预留：available -= qty, reserved += qty（事务内调用面）
    ///
    /// 负库存由 CHECK 约束兜底拒绝
    pub fn apply_reservation_in(
        conn: &Connection,
        inventory_id: i64,
        quantity_kg: f64,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE material_inventory
             SET available_quantity_kg = available_quantity_kg - ?1,
                 reserved_quantity_kg  = reserved_quantity_kg  + ?1
             WHERE id = ?2",
            params![quantity_kg, inventory_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "MaterialInventory".to_string(),
                id: inventory_id.to_string(),
            });
        }
        Ok(())
    }

    /// 增加可用库存，行不存在时新建（事务内调用面，回收产出入库用）
    pub fn add_available_in(
        conn: &Connection,
        material_id: i64,
        quantity_kg: f64,
    ) -> RepositoryResult<()> {
        conn.execute(
            "INSERT INTO material_inventory (material_id, available_quantity_kg, reserved_quantity_kg)
             VALUES (?1, ?2, 0)
             ON CONFLICT (material_id)
             DO UPDATE SET available_quantity_kg = available_quantity_kg + ?2",
            params![material_id, quantity_kg],
        )?;
        Ok(())
    }

    /// 新建库存行
    pub fn create(&self, material_id: i64, available_quantity_kg: f64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO material_inventory (material_id, available_quantity_kg, reserved_quantity_kg)
             VALUES (?1, ?2, 0)",
            params![material_id, available_quantity_kg],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 清零全部库存（模拟重置用）
    pub fn reset_all_in(conn: &Connection) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE material_inventory SET available_quantity_kg = 0, reserved_quantity_kg = 0",
            [],
        )?;
        Ok(())
    }
}
