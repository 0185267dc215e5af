// ==========================================
// 回收公司模拟系统 - 产出配比仓储
// ==========================================
// 职责: 手机→部件、部件→材料两张静态配比表的访问
// 红线: Repository 不含业务逻辑（配比计算在引擎层）
// ==========================================

use crate::domain::YieldRatioRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// 产出配比仓储
pub struct RatioRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RatioRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询某型号的全部配比行（两张配比表按部件内连接）
    pub fn find_yield_rows(&self, phone_id: i64) -> RepositoryResult<Vec<YieldRatioRow>> {
        let conn = self.get_conn()?;
        Self::find_yield_rows_in(&conn, phone_id)
    }

    /// 查询某型号的全部配比行（事务内调用面）
    pub fn find_yield_rows_in(conn: &Connection, phone_id: i64) -> RepositoryResult<Vec<YieldRatioRow>> {
        let mut stmt = conn.prepare(
            "SELECT pp.name, ppr.parts_per_phone, rm.id, rm.name, pmr.material_per_part
             FROM phone_part_ratio ppr
             JOIN phone_part pp ON pp.id = ppr.phone_part_id
             JOIN part_material_ratio pmr ON pmr.phone_part_id = ppr.phone_part_id
             JOIN raw_material rm ON rm.id = pmr.material_id
             WHERE ppr.phone_id = ?1
             ORDER BY pp.name, rm.name",
        )?;

        let rows = stmt
            .query_map(params![phone_id], |row| {
                Ok(YieldRatioRow {
                    part_name: row.get(0)?,
                    parts_per_phone: row.get(1)?,
                    material_id: row.get(2)?,
                    material_name: row.get(3)?,
                    material_per_part: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<YieldRatioRow>>>()?;

        Ok(rows)
    }

    /// 创建部件
    pub fn create_part(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO phone_part (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    /// 创建 手机→部件 配比行
    pub fn create_phone_part_ratio(
        &self,
        phone_id: i64,
        phone_part_id: i64,
        parts_per_phone: f64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO phone_part_ratio (phone_id, phone_part_id, parts_per_phone)
             VALUES (?1, ?2, ?3)",
            params![phone_id, phone_part_id, parts_per_phone],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 创建 部件→材料 配比行
    pub fn create_part_material_ratio(
        &self,
        phone_part_id: i64,
        material_id: i64,
        material_per_part: f64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO part_material_ratio (phone_part_id, material_id, material_per_part)
             VALUES (?1, ?2, ?3)",
            params![phone_part_id, material_id, material_per_part],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
