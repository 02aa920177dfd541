// ==========================================
// 配方编辑系统 - 配方缩放核心库
// ==========================================
// 职责: 归一化 / 得率两个弹窗共用的缩放引擎
// 系统定位: 决策支持 (预览由引擎计算，提交由人工确认)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 仓储层 - 配方快照
pub mod repository;

// 引擎层 - 缩放规则
pub mod engine;

// 配置层 - 弹窗默认参数
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 会话与提交
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BalancingMode, MassUnit, RoundingMode, RowRole, ScalingScope, ScalingWorkflow, SessionPhase,
    TargetMode,
};

// 领域实体
pub use domain::{
    Formula, FormulaEntry, FormulaRow, GroupMarker, IngredientRef, RowChange, ScalingActionLog,
    ScalingRequest, ScalingResult, ScalingWarning, Totals,
};

// 引擎
pub use engine::ScalingOrchestrator;

// API
pub use api::{ApiError, ApiResult, ScalingApi, ScalingSession};

// 配置
pub use config::ScalingProfile;

// 仓储
pub use repository::FormulaStore;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配方缩放引擎";
