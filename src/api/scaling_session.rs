// ==========================================
// 配方编辑系统 - 缩放会话（弹窗状态机）
// ==========================================
// 状态机: Idle → Configuring → PreviewComputed → (Warned | Ready) → Committed
// PreviewComputed 为 update() 内部过渡态，不作为静止状态对外暴露
// 红线:
// 1) 每次参数编辑全量重算（Configuring → PreviewComputed 重入）
// 2) 存在告警时必须显式确认后才能提交
// 3) 不可提交的结果即使告警已确认也必须拒绝，不得静默空操作
// 4) Committed 为终态；新的编辑需要新的会话
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::validate_request;
use crate::domain::action_log::ScalingActionLog;
use crate::domain::formula::Formula;
use crate::domain::scaling::{ScalingRequest, ScalingResult};
use crate::domain::types::{ScalingWorkflow, SessionPhase};
use crate::engine::orchestrator::ScalingOrchestrator;
use crate::engine::projector;
use std::sync::Arc;
use tracing::{debug, info};

/// 提交产物：新配方快照 + 审计日志
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    pub formula: Arc<Formula>,
    pub log: ScalingActionLog,
}

// ==========================================
// ScalingSession - 缩放会话
// ==========================================
#[derive(Debug)]
pub struct ScalingSession {
    formula: Arc<Formula>,
    workflow: ScalingWorkflow,
    orchestrator: ScalingOrchestrator,
    phase: SessionPhase,
    request: Option<ScalingRequest>,
    result: Option<ScalingResult>,
}

impl ScalingSession {
    /// 基于配方快照创建会话（Idle）
    pub fn new(
        formula: Arc<Formula>,
        workflow: ScalingWorkflow,
        orchestrator: ScalingOrchestrator,
    ) -> Self {
        Self {
            formula,
            workflow,
            orchestrator,
            phase: SessionPhase::Idle,
            request: None,
            result: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn workflow(&self) -> ScalingWorkflow {
        self.workflow
    }

    pub fn formula(&self) -> &Arc<Formula> {
        &self.formula
    }

    pub fn request(&self) -> Option<&ScalingRequest> {
        self.request.as_ref()
    }

    pub fn result(&self) -> Option<&ScalingResult> {
        self.result.as_ref()
    }

    fn transition_error(&self, to: SessionPhase) -> ApiError {
        ApiError::InvalidStateTransition {
            from: self.phase.to_string(),
            to: to.to_string(),
        }
    }

    /// 打开会话：Idle → Configuring
    ///
    /// 数据质量检查在任何配置之前执行；存在缺少原料主数据的行时整个工作流阻断
    pub fn open(&mut self) -> ApiResult<()> {
        if self.phase != SessionPhase::Idle {
            return Err(self.transition_error(SessionPhase::Configuring));
        }

        let invalid: Vec<String> = self
            .formula
            .rows()
            .filter(|r| !r.has_valid_ingredient())
            .map(|r| r.id.clone())
            .collect();
        if !invalid.is_empty() {
            tracing::warn!(
                formula_id = %self.formula.formula_id,
                invalid_rows = invalid.len(),
                "formula cannot be normalized"
            );
            return Err(ApiError::CannotNormalize { row_ids: invalid });
        }

        self.phase = SessionPhase::Configuring;
        debug!(formula_id = %self.formula.formula_id, workflow = %self.workflow, "会话进入配置阶段");
        Ok(())
    }

    /// 参数变更：重算预览，进入 Warned 或 Ready
    ///
    /// PreviewComputed 只在重算期间短暂持有，调用方观察到的阶段
    /// 只会是 Warned 或 Ready（校验失败时保持原阶段）
    pub fn update(&mut self, request: ScalingRequest) -> ApiResult<&ScalingResult> {
        match self.phase {
            SessionPhase::Configuring | SessionPhase::Warned | SessionPhase::Ready => {}
            _ => return Err(self.transition_error(SessionPhase::PreviewComputed)),
        }

        if request.workflow != self.workflow {
            return Err(ApiError::InvalidInput(format!(
                "请求工作流 {} 与会话工作流 {} 不一致",
                request.workflow, self.workflow
            )));
        }
        validate_request(&request)?;

        self.phase = SessionPhase::PreviewComputed;
        let result = self.orchestrator.preview(&self.formula, &request);
        debug!(
            phase = %self.phase,
            warnings = result.warnings.len(),
            can_commit = result.can_commit,
            "预览已重算"
        );

        self.phase = if result.has_warnings() {
            SessionPhase::Warned
        } else {
            SessionPhase::Ready
        };
        self.request = Some(request);

        Ok(self.result.insert(result))
    }

    /// 确认告警：Warned → Ready
    pub fn acknowledge_warnings(&mut self) -> ApiResult<()> {
        if self.phase != SessionPhase::Warned {
            return Err(self.transition_error(SessionPhase::Ready));
        }
        self.phase = SessionPhase::Ready;
        Ok(())
    }

    /// 生成提交产物（不改变会话状态）
    ///
    /// 校验顺序：阶段 → 可提交判定 → 告警确认
    pub fn prepare_commit(&self, actor: &str) -> ApiResult<CommitOutcome> {
        let result = match (&self.phase, &self.result) {
            (SessionPhase::Ready | SessionPhase::Warned, Some(result)) => result,
            _ => return Err(self.transition_error(SessionPhase::Committed)),
        };

        if !result.can_commit {
            return Err(ApiError::CommitRejected(format!(
                "结果不可提交: scale_factor={:.4}, normalizable_rows={}, row_changes={}",
                result.scale_factor,
                result.normalizable_count,
                result.row_changes.len()
            )));
        }

        if self.phase == SessionPhase::Warned {
            return Err(ApiError::WarningsNotAcknowledged {
                count: result.warnings.len(),
            });
        }

        let next = projector::project_commit(&self.formula, result).ok_or_else(|| {
            ApiError::CommitRejected("结果不可提交".to_string())
        })?;
        let log = ScalingActionLog::from_result(result, actor, next.revision);

        Ok(CommitOutcome {
            formula: Arc::new(next),
            log,
        })
    }

    /// 标记为已提交（终态）
    pub(crate) fn mark_committed(&mut self) {
        self.phase = SessionPhase::Committed;
    }

    /// 提交（不经存储，直接返回新配方）
    pub fn commit(&mut self, actor: &str) -> ApiResult<CommitOutcome> {
        let outcome = self.prepare_commit(actor)?;
        self.mark_committed();
        info!(
            formula_id = %outcome.formula.formula_id,
            revision = outcome.formula.revision,
            action_id = %outcome.log.action_id,
            "缩放结果已提交"
        );
        Ok(outcome)
    }
}
