// ==========================================
// 回收公司模拟系统 - 公司仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::Company;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 公司仓储
pub struct CompanyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CompanyRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按名称查询公司
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        Self::find_by_name_in(&conn, name)
    }

    /// 按名称查询公司（事务内调用面）
    pub fn find_by_name_in(conn: &Connection, name: &str) -> RepositoryResult<Option<Company>> {
        let company = conn
            .query_row(
                "SELECT id, name FROM company WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Company {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(company)
    }

    /// 按 ID 查询公司
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Company>> {
        let conn = self.get_conn()?;
        let company = conn
            .query_row(
                "SELECT id, name FROM company WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Company {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(company)
    }

    /// 创建公司
    ///
    /// # 返回
    /// - Ok(i64): 新记录 ID
    pub fn create(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO company (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }
}
