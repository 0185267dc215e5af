// ==========================================
// 回收公司模拟系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================
// 约定: 每个仓储同时提供两种调用面：
// - 实例方法: 自行加锁，用于事务外的普通读写
// - `*_in(conn)` 关联函数: 供引擎在持有连接守卫的事务内调用
// ==========================================

pub mod company_repo;
pub mod error;
pub mod machine_repo;
pub mod material_repo;
pub mod order_repo;
pub mod phone_repo;
pub mod ratio_repo;

// 重导出核心仓储
pub use company_repo::CompanyRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use machine_repo::MachineRepository;
pub use material_repo::{MaterialInventoryRepository, RawMaterialRepository};
pub use order_repo::{OrderItemRepository, OrderRepository, OrderStatusRepository};
pub use phone_repo::{PhoneInventoryRepository, PhoneRepository};
pub use ratio_repo::RatioRepository;
