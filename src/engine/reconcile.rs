// ==========================================
// 配方编辑系统 - 残差对齐器
// ==========================================
// 职责: 取整后总量与目标总量的残差全部计入单一平衡行
// ==========================================
// 取舍: 这是引擎唯一有意打破"逐行等比缩放"的地方，
//       用单行精度换取配方级总量精确等于目标。
//       平衡行对齐后的用量不再按步长取整（总量优先）。
// 注: 取整阶段被截断为 0 的行，其损失质量不在此重新分配
// ==========================================

use crate::domain::formula::FormulaRow;
use crate::domain::scaling::{BalancingPolicy, RowChange, ScalingWarning};
use crate::domain::types::BalancingMode;

/// 残差容差（浮点运算无法保证精确为零）
pub const RESIDUAL_EPSILON: f64 = 1e-3;

/// 对齐结果
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// 对齐前残差 = target_total - Σ new_quantity
    pub residual: f64,
    /// 是否调整了平衡行
    pub adjusted: bool,
    pub warnings: Vec<ScalingWarning>,
}

// ==========================================
// 平衡行选择
// ==========================================

/// 选择平衡行
///
/// - manual: 指定行必须是本次可缩放行，否则告警并回落到 auto
/// - auto: 当前用量最大的可缩放行，并列时取先出现者
///
/// 注: auto 是启发式，不保证相对取整误差最小
pub fn select_balancing_row(
    normalizable: &[&FormulaRow],
    policy: &BalancingPolicy,
) -> (Option<String>, Vec<ScalingWarning>) {
    let mut warnings = Vec::new();

    if policy.mode == BalancingMode::Manual {
        let requested = policy.row_id.as_deref().unwrap_or("");
        if normalizable.iter().any(|r| r.id == requested) {
            return (Some(requested.to_string()), warnings);
        }
        tracing::warn!(row_id = requested, "manual balancing row is not normalizable, falling back to auto");
        warnings.push(ScalingWarning::BalancingRowUnavailable {
            row_id: requested.to_string(),
        });
    }

    let mut largest: Option<&FormulaRow> = None;
    for row in normalizable {
        match largest {
            Some(best) if row.quantity <= best.quantity => {}
            _ => largest = Some(*row),
        }
    }

    (largest.map(|r| r.id.clone()), warnings)
}

// ==========================================
// 残差对齐
// ==========================================

/// 将残差计入平衡行（截断为非负）
///
/// |residual| ≤ epsilon 视为已对齐，不做调整
pub fn reconcile(
    row_changes: &mut [RowChange],
    target_total: f64,
    balancing_row_id: Option<&str>,
    epsilon: f64,
) -> ReconcileOutcome {
    let sum: f64 = row_changes.iter().map(|c| c.new_quantity).sum();
    let residual = target_total - sum;
    let mut warnings = Vec::new();

    if residual.abs() <= epsilon {
        return ReconcileOutcome {
            residual,
            adjusted: false,
            warnings,
        };
    }

    let Some(change) = balancing_row_id
        .and_then(|id| row_changes.iter_mut().find(|c| c.row_id == id))
    else {
        tracing::warn!(residual, "no balancing row available, residual left unreconciled");
        return ReconcileOutcome {
            residual,
            adjusted: false,
            warnings,
        };
    };

    let adjusted = change.new_quantity + residual;
    if adjusted < 0.0 {
        tracing::warn!(
            row_id = %change.row_id,
            residual,
            shortfall = -adjusted,
            "balancing row collapsed to zero"
        );
        warnings.push(ScalingWarning::BalancingRowCollapsed {
            row_id: change.row_id.clone(),
            name: change.name.clone(),
            shortfall: -adjusted,
        });
        change.set_new_quantity(0.0);
    } else {
        change.set_new_quantity(adjusted);
    }

    tracing::debug!(
        row_id = %change.row_id,
        residual,
        new_quantity = change.new_quantity,
        "residual absorbed by balancing row"
    );

    ReconcileOutcome {
        residual,
        adjusted: true,
        warnings,
    }
}

/// 按新总量重算各行占比
pub fn refresh_percentages(row_changes: &mut [RowChange]) {
    let total: f64 = row_changes.iter().map(|c| c.new_quantity).sum();
    for change in row_changes.iter_mut() {
        change.new_percentage = if total > 0.0 {
            change.new_quantity / total * 100.0
        } else {
            0.0
        };
    }
}
