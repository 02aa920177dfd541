// ==========================================
// 配方编辑系统 - 缩放 API
// ==========================================
// 职责: 供视图层调用的缩放入口
// 1) 打开会话（归一化 / 得率弹窗）
// 2) 无状态预览
// 3) 提交：投影新配方 → 原子替换存储中的快照
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::scaling_session::{CommitOutcome, ScalingSession};
use crate::api::validator::validate_request;
use crate::config::ScalingProfile;
use crate::domain::action_log::ScalingActionLog;
use crate::domain::scaling::{ScalingRequest, ScalingResult};
use crate::domain::types::ScalingWorkflow;
use crate::engine::orchestrator::ScalingOrchestrator;
use crate::engine::projector;
use crate::repository::FormulaStore;
use std::sync::Arc;
use tracing::info;

// ==========================================
// ScalingApi - 缩放 API
// ==========================================
pub struct ScalingApi {
    store: Arc<FormulaStore>,
    profile: ScalingProfile,
    orchestrator: ScalingOrchestrator,
}

impl ScalingApi {
    /// 创建新的 ScalingApi 实例
    pub fn new(store: Arc<FormulaStore>, profile: ScalingProfile) -> Self {
        let orchestrator = ScalingOrchestrator::new(profile.residual_epsilon);
        Self {
            store,
            profile,
            orchestrator,
        }
    }

    pub fn profile(&self) -> &ScalingProfile {
        &self.profile
    }

    /// 弹窗初始请求
    pub fn default_request(&self, workflow: ScalingWorkflow) -> ScalingRequest {
        self.profile.default_request(workflow)
    }

    /// 打开缩放会话（数据质量不合格时直接返回 CannotNormalize）
    pub fn open_session(
        &self,
        formula_id: &str,
        workflow: ScalingWorkflow,
    ) -> ApiResult<ScalingSession> {
        let formula = self.store.get(formula_id)?;
        let mut session = ScalingSession::new(formula, workflow, self.orchestrator);
        session.open()?;
        Ok(session)
    }

    /// 无状态预览（基于存储中的当前快照）
    pub fn preview(&self, formula_id: &str, request: &ScalingRequest) -> ApiResult<ScalingResult> {
        validate_request(request)?;
        let formula = self.store.get(formula_id)?;
        Ok(self.orchestrator.preview(&formula, request))
    }

    /// 提交会话结果并原子替换存储快照
    pub fn commit_session(
        &self,
        session: &mut ScalingSession,
        actor: &str,
    ) -> ApiResult<CommitOutcome> {
        let outcome = session.prepare_commit(actor)?;
        let expected_revision = session.formula().revision;
        let stored = self
            .store
            .replace(expected_revision, outcome.formula.as_ref().clone())?;
        session.mark_committed();

        info!(
            formula_id = %stored.formula_id,
            revision = stored.revision,
            action_id = %outcome.log.action_id,
            actor,
            "缩放结果已提交"
        );

        Ok(CommitOutcome {
            formula: stored,
            log: outcome.log,
        })
    }

    /// 直接提交一个缩放结果
    ///
    /// # 参数
    /// - result: 预览结果
    /// - warnings_acknowledged: 调用方是否已让用户确认告警
    /// - actor: 操作人
    pub fn commit_result(
        &self,
        result: &ScalingResult,
        warnings_acknowledged: bool,
        actor: &str,
    ) -> ApiResult<CommitOutcome> {
        if !result.can_commit {
            return Err(ApiError::CommitRejected(format!(
                "结果不可提交: scale_factor={:.4}, normalizable_rows={}",
                result.scale_factor, result.normalizable_count
            )));
        }
        if result.has_warnings() && !warnings_acknowledged {
            return Err(ApiError::WarningsNotAcknowledged {
                count: result.warnings.len(),
            });
        }

        let current = self.store.get(&result.formula_id)?;
        if current.revision != result.formula_revision {
            return Err(ApiError::StaleFormulaRevision {
                formula_id: result.formula_id.clone(),
                expected: result.formula_revision,
                actual: current.revision,
            });
        }

        let next = projector::project_commit(&current, result)
            .ok_or_else(|| ApiError::CommitRejected("结果不可提交".to_string()))?;
        let log = ScalingActionLog::from_result(result, actor, next.revision);
        let stored = self.store.replace(result.formula_revision, next)?;

        info!(
            formula_id = %stored.formula_id,
            revision = stored.revision,
            action_id = %log.action_id,
            actor,
            "缩放结果已提交"
        );

        Ok(CommitOutcome {
            formula: stored,
            log,
        })
    }
}
