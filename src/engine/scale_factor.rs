// ==========================================
// 配方编辑系统 - 缩放因子计算
// ==========================================
// 公式: factor = (target_total - anchor_sum) / normalizable_sum
// 红线: 除零不得产生 NaN/Infinity 暴露给调用方
// ==========================================

use crate::domain::scaling::ScalingWarning;

/// 除零时返回的哨兵因子（不缩放）
pub const SENTINEL_FACTOR: f64 = 1.0;

/// 缩放因子计算结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactorOutcome {
    pub factor: f64,
    /// false 表示可缩放行合计为零，调用方不得产生行变更
    pub feasible: bool,
    pub warnings: Vec<ScalingWarning>,
}

/// 计算统一缩放因子
///
/// - normalizable_sum == 0（或非有限）: 告警，返回哨兵因子 1，不可行
/// - factor ≤ 0: 告警但继续（预览仍可渲染，行用量随后被截断到 0）
pub fn compute_scale_factor(
    target_total: f64,
    anchor_sum: f64,
    normalizable_sum: f64,
) -> ScaleFactorOutcome {
    if normalizable_sum == 0.0 || !normalizable_sum.is_finite() {
        tracing::warn!(target_total, anchor_sum, "sum of normalizable rows is zero");
        return ScaleFactorOutcome {
            factor: SENTINEL_FACTOR,
            feasible: false,
            warnings: vec![ScalingWarning::ZeroNormalizableSum],
        };
    }

    let factor = (target_total - anchor_sum) / normalizable_sum;
    let mut warnings = Vec::new();
    if factor <= 0.0 || !factor.is_finite() {
        tracing::warn!(factor, target_total, anchor_sum, "scale factor is zero or negative");
        warnings.push(ScalingWarning::NonPositiveScaleFactor { factor });
    }

    ScaleFactorOutcome {
        factor,
        feasible: true,
        warnings,
    }
}
