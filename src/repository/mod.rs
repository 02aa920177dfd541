// ==========================================
// 配方编辑系统 - 仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 持有配方快照，提供原子替换
// 注: 持久化由外部协作方负责，此处只保存内存快照
// ==========================================

pub mod error;
pub mod formula_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use formula_store::FormulaStore;
