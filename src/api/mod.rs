// ==========================================
// 回收公司模拟系统 - API层
// ==========================================
// 职责: 对外操作入口，统一 ServiceResponse 封套
// 分工: 业务性失败 → is_success=false; 基础设施失败 → ApiError
// ==========================================

pub mod error;
pub mod machine_api;
pub mod material_api;
pub mod order_api;
pub mod recycling_api;
pub mod simulation_api;

pub use error::{ApiError, ApiResult};
pub use machine_api::MachineApi;
pub use material_api::MaterialApi;
pub use order_api::OrderApi;
pub use recycling_api::RecyclingApi;
pub use simulation_api::SimulationApi;
