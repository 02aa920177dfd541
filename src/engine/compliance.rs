// ==========================================
// 配方编辑系统 - 告警与合规评估
// ==========================================
// 职责: 对齐之后检查各行占比上限
// 红线: 只追加告警，不删除上游告警；告警不阻断预览，仅门控提交
// ==========================================

use crate::domain::scaling::{RowChange, ScalingWarning};

/// 占比比较容差（%），避免 100.0000000001 这类浮点噪声误报
const PERCENTAGE_TOLERANCE: f64 = 1e-9;

/// 合规评估
///
/// 对配置了 max_percentage 且 new_percentage 超限的行：
/// 1) 在该行挂载 compliance_warning
/// 2) 向 warnings 追加一条配方级告警（点名原料）
pub fn evaluate(row_changes: &mut [RowChange], warnings: &mut Vec<ScalingWarning>) {
    for change in row_changes.iter_mut() {
        let Some(max_percentage) = change.max_percentage else {
            continue;
        };

        if change.new_percentage > max_percentage + PERCENTAGE_TOLERANCE {
            let warning = ScalingWarning::ComplianceLimitExceeded {
                row_id: change.row_id.clone(),
                name: change.name.clone(),
                percentage: change.new_percentage,
                max_percentage,
            };
            tracing::warn!(
                row_id = %change.row_id,
                percentage = change.new_percentage,
                max_percentage,
                "compliance limit exceeded"
            );
            change.compliance_warning = Some(warning.clone());
            warnings.push(warning);
        } else {
            change.compliance_warning = None;
        }
    }
}
