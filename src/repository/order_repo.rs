// ==========================================
// 回收公司模拟系统 - 订单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约定: 订单时间戳以 RFC3339 文本落库（模拟时间）
// ==========================================

use crate::domain::{Order, OrderItem, OrderStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let order_number: String = row.get(1)?;
    Ok(Order {
        id: row.get(0)?,
        order_number: Uuid::parse_str(&order_number).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?,
        company_id: row.get(2)?,
        order_status_id: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
    })
}

const ORDER_COLUMNS: &str = "id, order_number, company_id, order_status_id, created_at, expires_at";

// ==========================================
// OrderStatusRepository - 订单状态仓储
// ==========================================

/// 订单状态（枚举表）仓储
pub struct OrderStatusRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderStatusRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按名称查询状态
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<OrderStatus>> {
        let conn = self.get_conn()?;
        Self::find_by_name_in(&conn, name)
    }

    /// 按名称查询状态（事务内调用面）
    pub fn find_by_name_in(conn: &Connection, name: &str) -> RepositoryResult<Option<OrderStatus>> {
        let status = conn
            .query_row(
                "SELECT id, name FROM order_status WHERE name = ?1",
                params![name],
                |row| {
                    Ok(OrderStatus {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(status)
    }

    /// 按 ID 查询状态
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<OrderStatus>> {
        let conn = self.get_conn()?;
        let status = conn
            .query_row(
                "SELECT id, name FROM order_status WHERE id = ?1",
                params![id],
                |row| {
                    Ok(OrderStatus {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(status)
    }
}

// ==========================================
// OrderRepository - 订单仓储
// ==========================================

/// 订单仓储
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建订单（事务内调用面）
    ///
    /// # 返回
    /// - Ok(i64): 新订单 ID
    pub fn create_in(
        conn: &Connection,
        order_number: Uuid,
        company_id: i64,
        order_status_id: i64,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO orders (order_number, company_id, order_status_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![order_number.to_string(), company_id, order_status_id, created_at, expires_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按 ID 查询订单
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![id],
                map_order_row,
            )
            .optional()?;

        Ok(order)
    }

    /// 按订单号查询订单
    pub fn find_by_order_number(&self, order_number: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;
        let order = conn
            .query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = ?1"),
                params![order_number],
                map_order_row,
            )
            .optional()?;

        Ok(order)
    }

    /// 更新订单状态（付款确认等外部通知驱动）
    pub fn update_status(&self, order_id: i64, order_status_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE orders SET order_status_id = ?1 WHERE id = ?2",
            params![order_status_id, order_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Order".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除全部订单与订单项（模拟重置用）
    pub fn delete_all_in(conn: &Connection) -> RepositoryResult<()> {
        conn.execute("DELETE FROM order_item", [])?;
        conn.execute("DELETE FROM orders", [])?;
        Ok(())
    }
}

// ==========================================
// OrderItemRepository - 订单项仓储
// ==========================================

/// 订单项仓储
pub struct OrderItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderItemRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建订单项（事务内调用面）
    pub fn create_in(
        conn: &Connection,
        order_id: i64,
        material_id: i64,
        quantity_kg: f64,
        price_per_kg: f64,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO order_item (order_id, material_id, quantity_kg, price_per_kg)
             VALUES (?1, ?2, ?3, ?4)",
            params![order_id, material_id, quantity_kg, price_per_kg],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按订单 ID 查询订单项
    pub fn find_by_order_id(&self, order_id: i64) -> RepositoryResult<Vec<OrderItem>> {
        let conn = self.get_conn()?;
        Self::find_by_order_id_in(&conn, order_id)
    }

    /// 按订单 ID 查询订单项（事务内调用面）
    pub fn find_by_order_id_in(conn: &Connection, order_id: i64) -> RepositoryResult<Vec<OrderItem>> {
        let mut stmt = conn.prepare(
            "SELECT id, order_id, material_id, quantity_kg, price_per_kg
             FROM order_item WHERE order_id = ?1 ORDER BY id",
        )?;

        let items = stmt
            .query_map(params![order_id], |row| {
                Ok(OrderItem {
                    id: row.get(0)?,
                    order_id: row.get(1)?,
                    material_id: row.get(2)?,
                    quantity_kg: row.get(3)?,
                    price_per_kg: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<OrderItem>>>()?;

        Ok(items)
    }
}
