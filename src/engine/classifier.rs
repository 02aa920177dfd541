// ==========================================
// 配方编辑系统 - 行分类器
// ==========================================
// 职责: 将配方行划分为 锚点 / 可缩放 / 范围外 / 无效
// 红线: 缺少原料主数据的行不得被静默缩放
// ==========================================

use crate::domain::formula::FormulaRow;
use crate::domain::scaling::AnchorPolicy;
use crate::domain::types::{RowRole, ScalingScope};
use std::collections::BTreeSet;

/// 分类结果（各集合保持输入顺序）
#[derive(Debug, Clone, Default)]
pub struct ClassifiedRows<'a> {
    pub ordered: Vec<(&'a FormulaRow, RowRole)>,
    pub anchors: Vec<&'a FormulaRow>,
    pub normalizable: Vec<&'a FormulaRow>,
    pub unselected: Vec<&'a FormulaRow>,
    pub invalid: Vec<&'a FormulaRow>,
}

impl<'a> ClassifiedRows<'a> {
    pub fn anchor_sum(&self) -> f64 {
        self.anchors.iter().map(|r| r.quantity).sum()
    }

    pub fn normalizable_sum(&self) -> f64 {
        self.normalizable.iter().map(|r| r.quantity).sum()
    }

    /// 固定部分合计：锚点 + 范围外 + 无效行
    pub fn fixed_sum(&self) -> f64 {
        self.anchor_sum()
            + self.unselected.iter().map(|r| r.quantity).sum::<f64>()
            + self.invalid.iter().map(|r| r.quantity).sum::<f64>()
    }

    pub fn invalid_ids(&self) -> Vec<String> {
        self.invalid.iter().map(|r| r.id.clone()).collect()
    }
}

// ==========================================
// RowClassifier - 行分类器
// ==========================================
// 无状态，所有方法都是纯函数
pub struct RowClassifier;

impl RowClassifier {
    /// 判定单行角色
    ///
    /// 规则：
    /// 1) 锁定行且策略视锁定为锚点 → Anchor
    /// 2) 合规覆写行且策略视覆写为锚点 → Anchor
    /// 3) 缺少原料主数据 → Invalid
    /// 4) allUnlocked 范围，或 selectedRows 范围且行被选中 → Normalizable
    /// 5) 其余 → Unselected
    pub fn role_of(
        row: &FormulaRow,
        policy: &AnchorPolicy,
        scope: ScalingScope,
        selected_ids: &BTreeSet<String>,
    ) -> RowRole {
        let is_anchor = (policy.treat_locked_as_anchor && row.is_locked)
            || (policy.treat_compliance_override_as_anchor && row.has_compliance_override);
        if is_anchor {
            return RowRole::Anchor;
        }

        if !row.has_valid_ingredient() {
            return RowRole::Invalid;
        }

        match scope {
            ScalingScope::AllUnlocked => RowRole::Normalizable,
            ScalingScope::SelectedRows if selected_ids.contains(&row.id) => RowRole::Normalizable,
            ScalingScope::SelectedRows => RowRole::Unselected,
        }
    }

    /// 分类全部行
    pub fn classify<'a, I>(
        rows: I,
        policy: &AnchorPolicy,
        scope: ScalingScope,
        selected_ids: &BTreeSet<String>,
    ) -> ClassifiedRows<'a>
    where
        I: IntoIterator<Item = &'a FormulaRow>,
    {
        let mut classified = ClassifiedRows::default();
        for row in rows {
            let role = Self::role_of(row, policy, scope, selected_ids);
            classified.ordered.push((row, role));
            match role {
                RowRole::Anchor => classified.anchors.push(row),
                RowRole::Normalizable => classified.normalizable.push(row),
                RowRole::Unselected => classified.unselected.push(row),
                RowRole::Invalid => classified.invalid.push(row),
            }
        }

        tracing::debug!(
            anchors = classified.anchors.len(),
            normalizable = classified.normalizable.len(),
            unselected = classified.unselected.len(),
            invalid = classified.invalid.len(),
            "rows classified"
        );

        classified
    }
}
