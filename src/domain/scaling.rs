// ==========================================
// 配方编辑系统 - 缩放请求与结果
// ==========================================
// 职责: ScalingRequest（输入配置）/ ScalingResult（派生结果）/ 告警
// 红线: ScalingResult 不单独持久化，每次配置变更全量重算
// ==========================================

use crate::domain::types::{
    BalancingMode, MassUnit, RoundingMode, RowRole, ScalingScope, ScalingWorkflow, TargetMode,
};
use crate::i18n::t_with_args;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// AnchorPolicy - 锚点策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorPolicy {
    pub treat_locked_as_anchor: bool,
    pub treat_compliance_override_as_anchor: bool,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self {
            treat_locked_as_anchor: true,
            treat_compliance_override_as_anchor: true,
        }
    }
}

// ==========================================
// BalancingPolicy - 平衡行策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancingPolicy {
    pub mode: BalancingMode,
    #[serde(default)]
    pub row_id: Option<String>, // 仅 manual 模式生效
}

// ==========================================
// RoundingPolicy - 取整策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundingPolicy {
    pub step: f64, // 取整步长（正数，如 0.01 / 0.1 / 1.0）
    pub mode: RoundingMode,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            step: 0.01,
            mode: RoundingMode::HalfUp,
        }
    }
}

// ==========================================
// ScalingRequest - 缩放请求
// ==========================================
// 由视图层在每次参数变更时重新构造（纯值，无副作用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingRequest {
    pub workflow: ScalingWorkflow,

    // ===== 目标 =====
    pub target_mode: TargetMode,
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub target_unit: MassUnit,
    #[serde(default)]
    pub loss_factor_percent: f64, // 仅 yield 模式（0~100）

    // ===== 范围 =====
    #[serde(default)]
    pub scope: ScalingScope,
    #[serde(default)]
    pub selected_row_ids: BTreeSet<String>,

    // ===== 策略 =====
    #[serde(default)]
    pub anchor_policy: AnchorPolicy,
    #[serde(default)]
    pub balancing: BalancingPolicy,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

impl ScalingRequest {
    /// 归一化请求（百分比模式，总量不变）
    pub fn normalize() -> Self {
        Self {
            workflow: ScalingWorkflow::Normalize,
            target_mode: TargetMode::Percentage,
            target_value: None,
            target_unit: MassUnit::Gram,
            loss_factor_percent: 0.0,
            scope: ScalingScope::AllUnlocked,
            selected_row_ids: BTreeSet::new(),
            anchor_policy: AnchorPolicy::default(),
            balancing: BalancingPolicy::default(),
            rounding: RoundingPolicy::default(),
        }
    }

    /// 绝对总量请求
    pub fn absolute(value: f64, unit: MassUnit) -> Self {
        Self {
            target_mode: TargetMode::AbsoluteAmount,
            target_value: Some(value),
            target_unit: unit,
            ..Self::normalize()
        }
    }

    /// 得率请求
    pub fn yield_target(value: f64, unit: MassUnit, loss_factor_percent: f64) -> Self {
        Self {
            workflow: ScalingWorkflow::Yield,
            target_mode: TargetMode::Yield,
            target_value: Some(value),
            target_unit: unit,
            loss_factor_percent,
            ..Self::normalize()
        }
    }

    pub fn with_rounding(mut self, step: f64, mode: RoundingMode) -> Self {
        self.rounding = RoundingPolicy { step, mode };
        self
    }

    pub fn with_selected_rows<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = ScalingScope::SelectedRows;
        self.selected_row_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_manual_balancing(mut self, row_id: impl Into<String>) -> Self {
        self.balancing = BalancingPolicy {
            mode: BalancingMode::Manual,
            row_id: Some(row_id.into()),
        };
        self
    }
}

// ==========================================
// ScalingWarning - 可行性/合规告警
// ==========================================
// 只追加、不去重；不阻断预览，仅门控提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScalingWarning {
    /// 可缩放行用量之和为零
    ZeroNormalizableSum,
    /// 缩放因子 ≤ 0
    NonPositiveScaleFactor { factor: f64 },
    /// 目标总量 ≤ 0
    TargetNotPositive { target: f64 },
    /// 损耗系数超出 0~100，已截断
    LossFactorClamped { requested: f64, applied: f64 },
    /// 指定平衡行不可用，回落到自动选择
    BalancingRowUnavailable { row_id: String },
    /// 平衡行被截断到 0，总量无法对齐
    BalancingRowCollapsed {
        row_id: String,
        name: String,
        shortfall: f64,
    },
    /// 占比超过合规上限
    ComplianceLimitExceeded {
        row_id: String,
        name: String,
        percentage: f64,
        max_percentage: f64,
    },
}

impl ScalingWarning {
    /// 本地化消息
    pub fn message(&self) -> String {
        match self {
            ScalingWarning::ZeroNormalizableSum => {
                t_with_args("scaling.warning.zero_normalizable_sum", &[])
            }
            ScalingWarning::NonPositiveScaleFactor { factor } => {
                let factor = format!("{:.4}", factor);
                t_with_args(
                    "scaling.warning.non_positive_scale_factor",
                    &[("factor", factor.as_str())],
                )
            }
            ScalingWarning::TargetNotPositive { target } => {
                let target = format!("{:.3}", target);
                t_with_args(
                    "scaling.warning.target_not_positive",
                    &[("target", target.as_str())],
                )
            }
            ScalingWarning::LossFactorClamped { requested, applied } => {
                let requested = requested.to_string();
                let applied = applied.to_string();
                t_with_args(
                    "scaling.warning.loss_factor_clamped",
                    &[("requested", requested.as_str()), ("applied", applied.as_str())],
                )
            }
            ScalingWarning::BalancingRowUnavailable { row_id } => t_with_args(
                "scaling.warning.balancing_row_unavailable",
                &[("row_id", row_id.as_str())],
            ),
            ScalingWarning::BalancingRowCollapsed {
                name, shortfall, ..
            } => {
                let shortfall = format!("{:.3}", shortfall);
                t_with_args(
                    "scaling.warning.balancing_row_collapsed",
                    &[("name", name.as_str()), ("shortfall", shortfall.as_str())],
                )
            }
            ScalingWarning::ComplianceLimitExceeded {
                name,
                percentage,
                max_percentage,
                ..
            } => {
                let percentage = format!("{:.2}", percentage);
                let max = format!("{:.2}", max_percentage);
                t_with_args(
                    "scaling.warning.compliance_limit_exceeded",
                    &[
                        ("name", name.as_str()),
                        ("percentage", percentage.as_str()),
                        ("max", max.as_str()),
                    ],
                )
            }
        }
    }
}

impl fmt::Display for ScalingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ==========================================
// RowChange - 单行变更
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowChange {
    pub row_id: String,
    pub name: String,
    pub role: RowRole,
    pub old_quantity: f64,
    pub new_quantity: f64,
    pub delta: f64,
    pub new_percentage: f64,
    pub is_anchor: bool,
    #[serde(default)]
    pub max_percentage: Option<f64>,
    #[serde(default)]
    pub compliance_warning: Option<ScalingWarning>,
}

impl RowChange {
    /// 未变更行（锚点/范围外/无效行）
    pub fn unchanged(row_id: &str, name: &str, role: RowRole, quantity: f64) -> Self {
        Self {
            row_id: row_id.to_string(),
            name: name.to_string(),
            role,
            old_quantity: quantity,
            new_quantity: quantity,
            delta: 0.0,
            new_percentage: 0.0,
            is_anchor: role == RowRole::Anchor,
            max_percentage: None,
            compliance_warning: None,
        }
    }

    /// 设置新用量并同步 delta
    pub fn set_new_quantity(&mut self, quantity: f64) {
        self.new_quantity = quantity;
        self.delta = quantity - self.old_quantity;
    }
}

// ==========================================
// Totals - 汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub amount: f64,
    pub cost: f64,
}

// ==========================================
// ScalingResult - 缩放结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingResult {
    // ===== 来源快照 =====
    pub formula_id: String,
    pub formula_revision: u32,
    pub workflow: ScalingWorkflow,
    pub target_mode: TargetMode,

    // ===== 计算中间量 =====
    pub target_total: f64,
    pub scale_factor: f64, // ≤0 表示不可行
    pub anchor_sum: f64,   // 固定部分（锚点 + 范围外 + 无效行）
    pub normalizable_sum: f64,
    pub normalizable_count: usize,
    pub balancing_row_id: Option<String>,
    pub residual: f64, // 对齐前残差

    // ===== 输出 =====
    pub row_changes: Vec<RowChange>,
    pub current_totals: Totals,
    pub new_totals: Totals,
    pub warnings: Vec<ScalingWarning>,
    pub data_quality_failures: Vec<String>,
    pub can_commit: bool,
}

impl ScalingResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 告警文本（按产生顺序）
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ScalingWarning::message).collect()
    }

    pub fn change_for(&self, row_id: &str) -> Option<&RowChange> {
        self.row_changes.iter().find(|c| c.row_id == row_id)
    }

    /// 新用量合计
    pub fn new_amount(&self) -> f64 {
        self.row_changes.iter().map(|c| c.new_quantity).sum()
    }
}
