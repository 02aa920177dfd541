// ==========================================
// 配方编辑系统 - 目标总量解析器
// ==========================================
// 职责: 目标模式 + 目标值 + 单位 → 目标总量（基础单位）
// 说明: 本阶段不报错；目标为零/不可解析时由下游缩放因子告警
// ==========================================

use crate::domain::scaling::ScalingWarning;
use crate::domain::types::{MassUnit, TargetMode};

/// 损耗系数允许范围（%）
pub const LOSS_FACTOR_MIN: f64 = 0.0;
pub const LOSS_FACTOR_MAX: f64 = 100.0;

/// 目标解析输入
#[derive(Debug, Clone, Copy)]
pub struct TargetInput {
    pub mode: TargetMode,
    pub value: Option<f64>,
    pub unit: MassUnit,
    pub current_total: f64,
    pub loss_factor_percent: f64,
}

/// 目标解析结果
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target_total: f64,
    pub warnings: Vec<ScalingWarning>,
}

// ==========================================
// TargetResolver - 目标总量解析器
// ==========================================
pub struct TargetResolver;

impl TargetResolver {
    /// 解析目标总量
    ///
    /// - percentage: 等于当前总量（只重算占比，不改变总质量）
    /// - absoluteAmount: value 换算到基础单位（缺值视为 0，由下游告警）
    /// - batchValue: 调用方提供的批量值，缺省回落到当前总量
    /// - yield: value 换算后 × (1 + loss/100)
    pub fn resolve(input: TargetInput) -> ResolvedTarget {
        let mut warnings = Vec::new();

        let value_in_base = input
            .value
            .filter(|v| v.is_finite())
            .map(|v| input.unit.to_base(v));

        let target_total = match input.mode {
            TargetMode::Percentage => input.current_total,
            TargetMode::AbsoluteAmount => value_in_base.unwrap_or(0.0),
            TargetMode::BatchValue => value_in_base.unwrap_or(input.current_total),
            TargetMode::Yield => {
                let loss = Self::clamp_loss_factor(input.loss_factor_percent, &mut warnings);
                value_in_base.unwrap_or(0.0) * (1.0 + loss / 100.0)
            }
        };

        if target_total <= 0.0 && input.mode != TargetMode::Percentage {
            warnings.push(ScalingWarning::TargetNotPositive {
                target: target_total,
            });
        }

        tracing::debug!(
            mode = %input.mode,
            unit = %input.unit,
            current_total = input.current_total,
            target_total,
            "target resolved"
        );

        ResolvedTarget {
            target_total,
            warnings,
        }
    }

    fn clamp_loss_factor(requested: f64, warnings: &mut Vec<ScalingWarning>) -> f64 {
        if !requested.is_finite() {
            warnings.push(ScalingWarning::LossFactorClamped {
                requested,
                applied: LOSS_FACTOR_MIN,
            });
            return LOSS_FACTOR_MIN;
        }

        let applied = requested.clamp(LOSS_FACTOR_MIN, LOSS_FACTOR_MAX);
        if applied != requested {
            warnings.push(ScalingWarning::LossFactorClamped { requested, applied });
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: TargetMode, value: Option<f64>, unit: MassUnit, current: f64) -> TargetInput {
        TargetInput {
            mode,
            value,
            unit,
            current_total: current,
            loss_factor_percent: 0.0,
        }
    }

    #[test]
    fn test_percentage_keeps_current_total() {
        let r = TargetResolver::resolve(input(TargetMode::Percentage, Some(999.0), MassUnit::Gram, 100.0));
        assert_eq!(r.target_total, 100.0);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_absolute_converts_units() {
        let r = TargetResolver::resolve(input(TargetMode::AbsoluteAmount, Some(1.2), MassUnit::Kilogram, 100.0));
        assert!((r.target_total - 1200.0).abs() < 1e-9);

        let r = TargetResolver::resolve(input(TargetMode::AbsoluteAmount, Some(0.5), MassUnit::Liter, 100.0));
        assert!((r.target_total - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_value_falls_back_to_current_total() {
        let r = TargetResolver::resolve(input(TargetMode::BatchValue, None, MassUnit::Gram, 250.0));
        assert_eq!(r.target_total, 250.0);

        let r = TargetResolver::resolve(input(TargetMode::BatchValue, Some(2.0), MassUnit::Kilogram, 250.0));
        assert_eq!(r.target_total, 2000.0);
    }

    #[test]
    fn test_yield_applies_loss_factor() {
        let mut i = input(TargetMode::Yield, Some(100.0), MassUnit::Gram, 200.0);
        i.loss_factor_percent = 10.0;
        let r = TargetResolver::resolve(i);
        assert!((r.target_total - 110.0).abs() < 1e-9);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_yield_loss_factor_is_clamped() {
        let mut i = input(TargetMode::Yield, Some(100.0), MassUnit::Gram, 200.0);
        i.loss_factor_percent = 150.0;
        let r = TargetResolver::resolve(i);
        assert!((r.target_total - 200.0).abs() < 1e-9);
        assert_eq!(
            r.warnings,
            vec![ScalingWarning::LossFactorClamped {
                requested: 150.0,
                applied: 100.0
            }]
        );
    }

    #[test]
    fn test_missing_absolute_value_warns() {
        let r = TargetResolver::resolve(input(TargetMode::AbsoluteAmount, None, MassUnit::Gram, 100.0));
        assert_eq!(r.target_total, 0.0);
        assert!(matches!(r.warnings[0], ScalingWarning::TargetNotPositive { .. }));
    }
}
