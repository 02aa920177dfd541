// ==========================================
// 配方编辑系统 - 缩放操作日志
// ==========================================
// 红线: 每次提交必须留痕（含已确认的告警）
// 用途: 审计追踪，回溯缩放参数
// ==========================================

use crate::domain::scaling::{ScalingResult, ScalingWarning};
use crate::domain::types::{ScalingWorkflow, TargetMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ScalingActionLog - 缩放提交日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingActionLog {
    // ===== 主键 =====
    pub action_id: String,
    pub action_ts: DateTime<Utc>,
    pub actor: String,

    // ===== 配方版本 =====
    pub formula_id: String,
    pub revision_before: u32,
    pub revision_after: u32,

    // ===== 缩放参数 =====
    pub workflow: ScalingWorkflow,
    pub target_mode: TargetMode,
    pub target_total: f64,
    pub scale_factor: f64,
    pub balancing_row_id: Option<String>,

    // ===== 影响摘要 =====
    pub amount_before: f64,
    pub amount_after: f64,
    pub cost_before: f64,
    pub cost_after: f64,
    pub acknowledged_warnings: Vec<ScalingWarning>,
    pub row_changes: Vec<RowChangeSummary>,
}

/// 行变更摘要（只记录用量有变化的行）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowChangeSummary {
    pub row_id: String,
    pub old_quantity: f64,
    pub new_quantity: f64,
}

impl ScalingActionLog {
    /// 由缩放结果生成提交日志
    pub fn from_result(result: &ScalingResult, actor: &str, revision_after: u32) -> Self {
        Self {
            action_id: Uuid::new_v4().to_string(),
            action_ts: Utc::now(),
            actor: actor.to_string(),
            formula_id: result.formula_id.clone(),
            revision_before: result.formula_revision,
            revision_after,
            workflow: result.workflow,
            target_mode: result.target_mode,
            target_total: result.target_total,
            scale_factor: result.scale_factor,
            balancing_row_id: result.balancing_row_id.clone(),
            amount_before: result.current_totals.amount,
            amount_after: result.new_totals.amount,
            cost_before: result.current_totals.cost,
            cost_after: result.new_totals.cost,
            acknowledged_warnings: result.warnings.clone(),
            row_changes: result
                .row_changes
                .iter()
                .filter(|c| c.delta != 0.0)
                .map(|c| RowChangeSummary {
                    row_id: c.row_id.clone(),
                    old_quantity: c.old_quantity,
                    new_quantity: c.new_quantity,
                })
                .collect(),
        }
    }
}
