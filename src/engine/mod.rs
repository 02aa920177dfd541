// ==========================================
// 配方编辑系统 - 引擎层
// ==========================================
// 职责: 配方缩放引擎（归一化 / 得率两个工作流共用）
// 红线: 引擎无状态、无 I/O，所有可行性问题以告警数据返回
// ==========================================

pub mod classifier;
pub mod compliance;
pub mod orchestrator;
pub mod projector;
pub mod reconcile;
pub mod rounding;
pub mod scale_factor;
pub mod target;

// 重导出核心引擎
pub use classifier::{ClassifiedRows, RowClassifier};
pub use orchestrator::ScalingOrchestrator;
pub use projector::{can_commit, project};
pub use reconcile::{reconcile, select_balancing_row, ReconcileOutcome, RESIDUAL_EPSILON};
pub use rounding::{clamp_non_negative, round_to_step};
pub use scale_factor::{compute_scale_factor, ScaleFactorOutcome};
pub use target::{ResolvedTarget, TargetInput, TargetResolver};
