// ==========================================
// 配方编辑系统 - 领域模型层
// ==========================================
// 职责: 定义配方实体、缩放请求/结果、操作日志
// 红线: 不含存储逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod formula;
pub mod scaling;
pub mod types;

// 重导出核心类型
pub use action_log::{RowChangeSummary, ScalingActionLog};
pub use formula::{Formula, FormulaEntry, FormulaRow, GroupMarker, IngredientRef};
pub use scaling::{
    AnchorPolicy, BalancingPolicy, RoundingPolicy, RowChange, ScalingRequest, ScalingResult,
    ScalingWarning, Totals,
};
pub use types::{
    BalancingMode, MassUnit, RoundingMode, RowRole, ScalingScope, ScalingWorkflow, SessionPhase,
    TargetMode,
};
