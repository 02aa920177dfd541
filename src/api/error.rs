// ==========================================
// 配方编辑系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 说明: 引擎本身不报错（可行性问题为告警数据），
//       这里只承载 数据质量阻断 / 调用方误用 / 存储冲突
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 数据质量错误（阻断整个工作流）
    // ==========================================
    #[error("无法归一化: 以下行缺少原料主数据 {row_ids:?}")]
    CannotNormalize { row_ids: Vec<String> },

    // ==========================================
    // 调用方误用
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("提交被拒绝: {0}")]
    CommitRejected(String),

    #[error("存在 {count} 条告警尚未确认，不能提交")]
    WarningsNotAcknowledged { count: usize },

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("配方版本已过期: formula_id={formula_id}, expected_revision={expected}, actual_revision={actual}")]
    StaleFormulaRevision {
        formula_id: String,
        expected: u32,
        actual: u32,
    },

    // ==========================================
    // 存储/配置错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::OptimisticLockFailure {
                formula_id,
                expected,
                actual,
            } => ApiError::StaleFormulaRevision {
                formula_id,
                expected,
                actual,
            },
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::InternalError(format!("存储锁获取失败: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
