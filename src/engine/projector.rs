// ==========================================
// 配方编辑系统 - 预览/提交投影
// ==========================================
// 职责: 行变更 → 新配方快照（纯函数，不修改输入）
// 红线: 行ID稳定；只替换 quantity / concentration；分组标记原样透传
// ==========================================

use crate::domain::formula::{Formula, FormulaEntry};
use crate::domain::scaling::{RowChange, ScalingResult};
use std::collections::HashMap;

/// 是否允许提交
///
/// 条件（全部满足）：
/// 1) 至少一条行变更
/// 2) 至少一个可缩放行
/// 3) scale_factor > 0
/// 4) 新总量与目标总量之差不超过 epsilon（平衡行被截断时不满足）
pub fn can_commit(
    row_changes: &[RowChange],
    normalizable_count: usize,
    scale_factor: f64,
    target_total: f64,
    epsilon: f64,
) -> bool {
    if row_changes.is_empty()
        || normalizable_count == 0
        || !scale_factor.is_finite()
        || scale_factor <= 0.0
    {
        return false;
    }

    let new_total: f64 = row_changes.iter().map(|c| c.new_quantity).sum();
    (new_total - target_total).abs() <= epsilon
}

/// 将行变更投影为新配方
///
/// concentration 按新总量（全部有变更记录的行）重算；修订号不在此递增
pub fn project(formula: &Formula, row_changes: &[RowChange]) -> Formula {
    let by_id: HashMap<&str, &RowChange> = row_changes
        .iter()
        .map(|c| (c.row_id.as_str(), c))
        .collect();
    let new_total: f64 = row_changes.iter().map(|c| c.new_quantity).sum();

    let entries = formula
        .entries
        .iter()
        .map(|entry| match entry {
            FormulaEntry::Ingredient(row) => match by_id.get(row.id.as_str()) {
                Some(change) => {
                    let mut row = row.clone();
                    row.quantity = change.new_quantity;
                    row.concentration = if new_total > 0.0 {
                        change.new_quantity / new_total * 100.0
                    } else {
                        0.0
                    };
                    FormulaEntry::Ingredient(row)
                }
                None => entry.clone(),
            },
            FormulaEntry::Group(_) => entry.clone(),
        })
        .collect();

    Formula {
        entries,
        ..formula.clone()
    }
}

/// 提交投影：校验结果与配方快照一致后生成下一修订
///
/// 返回 None 表示结果不可提交（调用方负责转换为显式错误）
pub fn project_commit(formula: &Formula, result: &ScalingResult) -> Option<Formula> {
    if !result.can_commit {
        return None;
    }
    let mut next = project(formula, &result.row_changes);
    next.revision = formula.revision.saturating_add(1);
    Some(next)
}
