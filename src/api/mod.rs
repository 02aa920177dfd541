// ==========================================
// 配方编辑系统 - API 层
// ==========================================
// 职责: 提供缩放 API 接口,供视图层事件处理器调用
// ==========================================

pub mod error;
pub mod scaling_api;
pub mod scaling_session;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use scaling_api::ScalingApi;
pub use scaling_session::{CommitOutcome, ScalingSession};
pub use validator::validate_request;
