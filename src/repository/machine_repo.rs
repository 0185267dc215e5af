// ==========================================
// 回收公司模拟系统 - 回收机器仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::Machine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

/// 回收机器仓储
pub struct MachineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MachineRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部机器
    pub fn get_all(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, is_operational FROM machine ORDER BY id")?;

        let machines = stmt
            .query_map([], |row| {
                Ok(Machine {
                    id: row.get(0)?,
                    is_operational: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<Machine>>>()?;

        Ok(machines)
    }

    /// 机器总数（事务内调用面）
    pub fn count_all_in(conn: &Connection) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM machine", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 可运转机器数（事务内调用面）
    pub fn count_operational_in(conn: &Connection) -> RepositoryResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM machine WHERE is_operational = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 登记新机器
    pub fn create(&self, is_operational: bool) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO machine (is_operational) VALUES (?1)",
            params![is_operational],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 将 count 台机器标记为指定运转状态
    ///
    /// 故障通知按台数报修，不指定具体机器；按 ID 顺序选取处于相反状态的机器
    ///
    /// # 返回
    /// - Ok(usize): 实际翻转的机器数
    pub fn mark_operational(&self, count: i64, operational: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE machine SET is_operational = ?1
             WHERE id IN (
                 SELECT id FROM machine WHERE is_operational = ?2 ORDER BY id LIMIT ?3
             )",
            params![operational, !operational, count],
        )?;
        Ok(affected)
    }
}
