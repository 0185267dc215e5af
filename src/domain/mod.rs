// ==========================================
// 回收公司模拟系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、结果对象、响应封套
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod company;
pub mod machine;
pub mod material;
pub mod order;
pub mod phone;
pub mod recycling;
pub mod response;

// 重导出核心类型
pub use company::Company;
pub use machine::Machine;
pub use material::{MaterialInventory, RawMaterial, RawMaterialPrice};
pub use order::{Order, OrderItem, OrderItemView, OrderStatus, OrderView};
pub use phone::{Phone, PhoneInventory, YieldRatioRow};
pub use recycling::{PhoneYieldEstimate, RecycledMaterialResult, RecyclingResult};
pub use response::ServiceResponse;
