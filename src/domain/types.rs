// ==========================================
// 配方编辑系统 - 领域类型定义
// ==========================================
// 范围: 缩放请求的各配置轴（目标模式/范围/平衡/取整/单位）
// 序列化格式: camelCase (与视图层一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 目标模式 (Target Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetMode {
    Percentage,     // 归一化到 100%，总量不变
    AbsoluteAmount, // 指定绝对总量
    BatchValue,     // 使用批量值（缺省回落到当前总量）
    Yield,          // 得率 + 损耗补偿
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMode::Percentage => write!(f, "percentage"),
            TargetMode::AbsoluteAmount => write!(f, "absoluteAmount"),
            TargetMode::BatchValue => write!(f, "batchValue"),
            TargetMode::Yield => write!(f, "yield"),
        }
    }
}

// ==========================================
// 质量单位 (Mass Unit)
// ==========================================
// 固定换算表: g ×1, kg ×1000, L ×1000
// 注: 升按 1:1 质量当量处理（领域简化，不做密度换算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassUnit {
    #[default]
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "L")]
    Liter,
}

impl MassUnit {
    /// 换算到基础单位（克当量）的倍率
    pub fn to_base_factor(self) -> f64 {
        match self {
            MassUnit::Gram => 1.0,
            MassUnit::Kilogram => 1000.0,
            MassUnit::Liter => 1000.0,
        }
    }

    /// 换算到基础单位
    pub fn to_base(self, value: f64) -> f64 {
        value * self.to_base_factor()
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassUnit::Gram => write!(f, "g"),
            MassUnit::Kilogram => write!(f, "kg"),
            MassUnit::Liter => write!(f, "L"),
        }
    }
}

// ==========================================
// 缩放范围 (Scope)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalingScope {
    #[default]
    AllUnlocked,  // 全部非锚点行
    SelectedRows, // 仅选中行
}

// ==========================================
// 平衡行策略 (Balancing Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalancingMode {
    #[default]
    Auto,   // 当前用量最大的可缩放行（并列取先出现者）
    Manual, // 人工指定
}

// ==========================================
// 取整模式 (Rounding Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundingMode {
    #[default]
    HalfUp,  // 四舍五入（远离零）
    Down,    // 向下取整
    Bankers, // 四舍六入五成双
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfUp => write!(f, "halfUp"),
            RoundingMode::Down => write!(f, "down"),
            RoundingMode::Bankers => write!(f, "bankers"),
        }
    }
}

impl std::str::FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halfup" | "half_up" => Ok(RoundingMode::HalfUp),
            "down" | "floor" => Ok(RoundingMode::Down),
            "bankers" | "half_even" | "halfeven" => Ok(RoundingMode::Bankers),
            other => Err(format!("未知取整模式: {}", other)),
        }
    }
}

// ==========================================
// 行角色 (Row Role)
// ==========================================
// 每个可缩放行在一次请求中恰属于一种角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowRole {
    Anchor,       // 锚点，用量固定
    Normalizable, // 参与缩放
    Unselected,   // 选中范围外，用量固定
    Invalid,      // 缺少原料主数据，不参与缩放
}

impl RowRole {
    /// 是否参与缩放
    pub fn is_scaled(self) -> bool {
        matches!(self, RowRole::Normalizable)
    }
}

// ==========================================
// 缩放工作流 (Workflow)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalingWorkflow {
    Normalize, // 归一化弹窗
    Yield,     // 得率弹窗
}

impl ScalingWorkflow {
    /// 工作流允许的目标模式
    pub fn accepts(self, mode: TargetMode) -> bool {
        match self {
            ScalingWorkflow::Normalize => matches!(
                mode,
                TargetMode::Percentage | TargetMode::AbsoluteAmount | TargetMode::BatchValue
            ),
            ScalingWorkflow::Yield => mode == TargetMode::Yield,
        }
    }
}

impl fmt::Display for ScalingWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalingWorkflow::Normalize => write!(f, "normalize"),
            ScalingWorkflow::Yield => write!(f, "yield"),
        }
    }
}

// ==========================================
// 会话阶段 (Session Phase)
// ==========================================
// Idle → Configuring → PreviewComputed → (Warned | Ready) → Committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionPhase {
    Idle,
    Configuring,
    /// 过渡态：仅在 update() 重算期间存在，返回前必定转入 Warned 或 Ready
    PreviewComputed,
    Warned,
    Ready,
    Committed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "IDLE"),
            SessionPhase::Configuring => write!(f, "CONFIGURING"),
            SessionPhase::PreviewComputed => write!(f, "PREVIEW_COMPUTED"),
            SessionPhase::Warned => write!(f, "WARNED"),
            SessionPhase::Ready => write!(f, "READY"),
            SessionPhase::Committed => write!(f, "COMMITTED"),
        }
    }
}
