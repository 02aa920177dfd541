// ==========================================
// 配方编辑系统 - 配方快照存储
// ==========================================
// 职责: 持有当前配方快照（内存），提供原子整体替换
// 红线: 只允许整体替换 Arc<Formula>，不做字段级更新，
//       避免读者看到不一致的中间配方
// 并发: 乐观锁（revision 比对），过期结果提交被拒绝
// ==========================================

use crate::domain::formula::Formula;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ==========================================
// FormulaStore - 配方快照存储
// ==========================================
#[derive(Debug, Default)]
pub struct FormulaStore {
    formulas: RwLock<HashMap<String, Arc<Formula>>>,
}

impl FormulaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入/覆盖配方（初次加载用）
    pub fn insert(&self, formula: Formula) -> RepositoryResult<Arc<Formula>> {
        if formula.formula_id.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "formula_id 不能为空".to_string(),
            ));
        }

        let snapshot = Arc::new(formula);
        let mut guard = self
            .formulas
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        guard.insert(snapshot.formula_id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    /// 读取配方快照
    pub fn get(&self, formula_id: &str) -> RepositoryResult<Arc<Formula>> {
        let guard = self
            .formulas
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        guard
            .get(formula_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Formula".to_string(),
                id: formula_id.to_string(),
            })
    }

    /// 原子替换配方快照
    ///
    /// # 参数
    /// - expected_revision: 生成新配方时所基于的修订号
    /// - formula: 新配方（revision 应已递增）
    ///
    /// # 返回
    /// - Ok: 替换后的快照
    /// - Err(OptimisticLockFailure): 存储中的修订号已变化
    pub fn replace(&self, expected_revision: u32, formula: Formula) -> RepositoryResult<Arc<Formula>> {
        let mut guard = self
            .formulas
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let current = guard
            .get(&formula.formula_id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Formula".to_string(),
                id: formula.formula_id.clone(),
            })?;

        if current.revision != expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                formula_id: formula.formula_id.clone(),
                expected: expected_revision,
                actual: current.revision,
            });
        }

        let snapshot = Arc::new(formula);
        guard.insert(snapshot.formula_id.clone(), snapshot.clone());
        tracing::info!(
            formula_id = %snapshot.formula_id,
            revision = snapshot.revision,
            "formula snapshot replaced"
        );
        Ok(snapshot)
    }
}
