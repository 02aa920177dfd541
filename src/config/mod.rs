// ==========================================
// 配方编辑系统 - 配置层
// ==========================================
// 职责: 缩放弹窗默认参数（JSON 配置 + 环境变量覆写）
// ==========================================

pub mod scaling_profile;

// 重导出核心配置
pub use scaling_profile::{
    ScalingProfile, ENV_RESIDUAL_EPSILON, ENV_ROUNDING_MODE, ENV_ROUNDING_STEP,
};
