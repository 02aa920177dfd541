// ==========================================
// 配方编辑系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 并发控制错误 =====
    #[error("乐观锁冲突: formula_id={formula_id}, expected_revision={expected}, actual_revision={actual}")]
    OptimisticLockFailure {
        formula_id: String,
        expected: u32,
        actual: u32,
    },

    // ===== 存储错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("存储锁获取失败: {0}")]
    LockError(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
