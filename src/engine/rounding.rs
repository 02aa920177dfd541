// ==========================================
// 配方编辑系统 - 取整引擎
// ==========================================
// 模式: halfUp（远离零）/ down（向下）/ bankers（五成双）
// 红线: 对 0.01 / 0.1 / 1.0 等十进制步长必须精确，
//       半点判定不得受二进制浮点表示误差影响
// ==========================================
// 做法: 用量与步长先转为十进制（按 f64 的最短往返表示），
//       在 Decimal 上计算 value / step 的整数网格索引并取整，再乘回步长
// ==========================================

use crate::domain::scaling::RoundingPolicy;
use crate::domain::types::RoundingMode;
use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal, RoundingStrategy,
};
use std::str::FromStr;

/// f64 → Decimal
///
/// 优先按最短往返十进制表示解析（0.29 → 0.29，而非 0.28999…），
/// 超出 Decimal 精度时回落到 from_f64
fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// 按步长与模式取整
///
/// 步长非正或非有限时原样返回（请求校验在 API 层完成）；
/// 超出 Decimal 表示范围的用量同样原样返回
pub fn round_to_step(value: f64, step: f64, mode: RoundingMode) -> f64 {
    if !value.is_finite() || !step.is_finite() || step <= 0.0 {
        return value;
    }

    let (Some(v), Some(s)) = (to_decimal(value), to_decimal(step)) else {
        return value;
    };
    if s.is_zero() {
        return value;
    }

    let Some(index) = v.checked_div(s) else {
        return value;
    };
    let index = match mode {
        RoundingMode::Down => index.floor(),
        RoundingMode::HalfUp => index.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        RoundingMode::Bankers => index.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven),
    };

    let rounded = index
        .checked_mul(s)
        .and_then(|d| d.to_f64())
        .unwrap_or(value);
    // 消除 -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// 按策略取整
pub fn apply_policy(value: f64, policy: &RoundingPolicy) -> f64 {
    round_to_step(value, policy.step, policy.mode)
}

/// 取整后截断为非负（负用量永远不是合法输出）
pub fn clamp_non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}
