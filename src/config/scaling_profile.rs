// ==========================================
// 配方编辑系统 - 缩放默认配置
// ==========================================
// 职责: 读取 JSON 配置文件 → 环境变量覆写 → 校验 → 生成默认缩放请求
// 缺省: 步长 0.01 / halfUp / 自动平衡行 / 残差容差 1e-3
// ==========================================

use crate::domain::scaling::{AnchorPolicy, BalancingPolicy, RoundingPolicy, ScalingRequest};
use crate::domain::types::{BalancingMode, MassUnit, RoundingMode, ScalingWorkflow};
use crate::engine::reconcile::RESIDUAL_EPSILON;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 环境变量：覆写取整步长
pub const ENV_ROUNDING_STEP: &str = "FORMULA_SCALING_ROUNDING_STEP";
/// 环境变量：覆写取整模式（halfUp / down / bankers）
pub const ENV_ROUNDING_MODE: &str = "FORMULA_SCALING_ROUNDING_MODE";
/// 环境变量：覆写残差容差
pub const ENV_RESIDUAL_EPSILON: &str = "FORMULA_SCALING_RESIDUAL_EPSILON";

/// 缩放默认配置（弹窗打开时的初始参数）
///
/// 存储位置：外部配置文件（JSON），所有字段均可缺省
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingProfile {
    /// 默认取整步长（基础单位）
    #[serde(default = "default_rounding_step")]
    pub rounding_step: f64,

    /// 默认取整模式
    #[serde(default)]
    pub rounding_mode: RoundingMode,

    /// 残差对齐容差
    #[serde(default = "default_residual_epsilon")]
    pub residual_epsilon: f64,

    /// 默认锚点策略
    #[serde(default)]
    pub anchor_policy: AnchorPolicy,

    /// 默认平衡行模式（manual 需在弹窗中再指定行）
    #[serde(default)]
    pub balancing_mode: BalancingMode,

    /// 得率弹窗默认损耗系数（%）
    #[serde(default)]
    pub default_loss_factor_percent: f64,

    /// 默认目标单位
    #[serde(default)]
    pub default_unit: MassUnit,
}

fn default_rounding_step() -> f64 {
    0.01
}

fn default_residual_epsilon() -> f64 {
    RESIDUAL_EPSILON
}

impl Default for ScalingProfile {
    fn default() -> Self {
        Self {
            rounding_step: default_rounding_step(),
            rounding_mode: RoundingMode::HalfUp,
            residual_epsilon: default_residual_epsilon(),
            anchor_policy: AnchorPolicy::default(),
            balancing_mode: BalancingMode::Auto,
            default_loss_factor_percent: 0.0,
            default_unit: MassUnit::Gram,
        }
    }
}

impl ScalingProfile {
    /// 从 JSON 字符串加载
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let profile: ScalingProfile =
            serde_json::from_str(raw).context("缩放配置 JSON 解析失败")?;
        profile.validate()?;
        Ok(profile)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("读取缩放配置失败: {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// 应用环境变量覆写（无效值忽略并记录告警）
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// 应用覆写（取值函数便于测试注入）
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_ROUNDING_STEP) {
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => self.rounding_step = v,
                _ => tracing::warn!(key = ENV_ROUNDING_STEP, value = %raw, "ignored invalid override"),
            }
        }

        if let Some(raw) = lookup(ENV_ROUNDING_MODE) {
            match raw.parse::<RoundingMode>() {
                Ok(mode) => self.rounding_mode = mode,
                Err(e) => tracing::warn!(key = ENV_ROUNDING_MODE, error = %e, "ignored invalid override"),
            }
        }

        if let Some(raw) = lookup(ENV_RESIDUAL_EPSILON) {
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => self.residual_epsilon = v,
                _ => tracing::warn!(key = ENV_RESIDUAL_EPSILON, value = %raw, "ignored invalid override"),
            }
        }

        self
    }

    /// 校验配置
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.rounding_step.is_finite() || self.rounding_step <= 0.0 {
            bail!("roundingStep 必须为正数: {}", self.rounding_step);
        }
        if !self.residual_epsilon.is_finite() || self.residual_epsilon <= 0.0 {
            bail!("residualEpsilon 必须为正数: {}", self.residual_epsilon);
        }
        if !(0.0..=100.0).contains(&self.default_loss_factor_percent) {
            bail!(
                "defaultLossFactorPercent 必须在 0~100 之间: {}",
                self.default_loss_factor_percent
            );
        }
        Ok(())
    }

    /// 按工作流生成初始请求
    ///
    /// - Normalize: 百分比模式（总量不变）
    /// - Yield: 得率模式，目标值缺省为空，由用户填写
    pub fn default_request(&self, workflow: ScalingWorkflow) -> ScalingRequest {
        let mut request = match workflow {
            ScalingWorkflow::Normalize => ScalingRequest::normalize(),
            ScalingWorkflow::Yield => {
                let mut r = ScalingRequest::yield_target(0.0, self.default_unit, self.default_loss_factor_percent);
                r.target_value = None;
                r
            }
        };
        request.target_unit = self.default_unit;
        request.anchor_policy = self.anchor_policy;
        request.balancing = BalancingPolicy {
            mode: self.balancing_mode,
            row_id: None,
        };
        request.rounding = RoundingPolicy {
            step: self.rounding_step,
            mode: self.rounding_mode,
        };
        request
    }
}
