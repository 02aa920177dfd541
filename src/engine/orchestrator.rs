// ==========================================
// 配方编辑系统 - 缩放引擎编排器
// ==========================================
// 主流程: 分类 → 目标解析 → 缩放因子 → 逐行取整 → 残差对齐 → 合规评估 → 投影
// 红线: 每个阶段都是输入的纯函数；每次参数变更全量重算，不做增量修补
// ==========================================

use crate::domain::formula::Formula;
use crate::domain::scaling::{RowChange, ScalingRequest, ScalingResult, Totals};
use crate::domain::types::{MassUnit, TargetMode};
use crate::engine::classifier::RowClassifier;
use crate::engine::reconcile::{self, RESIDUAL_EPSILON};
use crate::engine::rounding::{apply_policy, clamp_non_negative};
use crate::engine::scale_factor::compute_scale_factor;
use crate::engine::target::{TargetInput, TargetResolver};
use crate::engine::{compliance, projector};
use tracing::{debug, info, instrument};

// ==========================================
// ScalingOrchestrator - 缩放引擎编排器
// ==========================================
// 无跨调用可变状态；并发预览互不影响，过期结果直接丢弃即可
#[derive(Debug, Clone, Copy)]
pub struct ScalingOrchestrator {
    residual_epsilon: f64,
}

impl Default for ScalingOrchestrator {
    fn default() -> Self {
        Self::new(RESIDUAL_EPSILON)
    }
}

impl ScalingOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - residual_epsilon: 残差对齐容差（非正数或非有限时回落到默认值）
    pub fn new(residual_epsilon: f64) -> Self {
        let residual_epsilon = if residual_epsilon.is_finite() && residual_epsilon > 0.0 {
            residual_epsilon
        } else {
            RESIDUAL_EPSILON
        };
        Self { residual_epsilon }
    }

    pub fn residual_epsilon(&self) -> f64 {
        self.residual_epsilon
    }

    /// 计算预览结果
    ///
    /// # 参数
    /// - formula: 当前配方快照（不会被修改）
    /// - request: 缩放请求
    ///
    /// # 返回
    /// 缩放结果；所有可行性问题以告警形式返回，不抛错
    #[instrument(skip(self, formula, request), fields(
        formula_id = %formula.formula_id,
        revision = formula.revision,
        rows = formula.entries.len(),
        target_mode = %request.target_mode
    ))]
    pub fn preview(&self, formula: &Formula, request: &ScalingRequest) -> ScalingResult {
        let mut warnings = Vec::new();

        // ==========================================
        // 步骤1: 行分类
        // ==========================================
        let classified = RowClassifier::classify(
            formula.rows(),
            &request.anchor_policy,
            request.scope,
            &request.selected_row_ids,
        );
        let current_total = formula.total_amount();
        let current_totals = Totals {
            amount: current_total,
            cost: formula.rows().map(|r| r.cost_at(r.quantity)).sum(),
        };

        // ==========================================
        // 步骤2: 目标解析
        // ==========================================
        let (value, unit) = match (request.target_mode, request.target_value) {
            // 配方批量值已换算到基础单位
            (TargetMode::BatchValue, None) => (formula.batch_value_in_base(), MassUnit::Gram),
            (_, value) => (value, request.target_unit),
        };
        let resolved = TargetResolver::resolve(TargetInput {
            mode: request.target_mode,
            value,
            unit,
            current_total,
            loss_factor_percent: request.loss_factor_percent,
        });
        let target_total = resolved.target_total;
        warnings.extend(resolved.warnings);

        // ==========================================
        // 步骤3: 缩放因子
        // ==========================================
        let anchor_sum = classified.fixed_sum();
        let normalizable_sum = classified.normalizable_sum();
        let factor = compute_scale_factor(target_total, anchor_sum, normalizable_sum);
        warnings.extend(factor.warnings);
        debug!(
            target_total,
            anchor_sum,
            normalizable_sum,
            scale_factor = factor.factor,
            "步骤3: 缩放因子计算完成"
        );

        if !factor.feasible {
            // 除零：不产生任何行变更，结果不可提交
            return ScalingResult {
                formula_id: formula.formula_id.clone(),
                formula_revision: formula.revision,
                workflow: request.workflow,
                target_mode: request.target_mode,
                target_total,
                scale_factor: factor.factor,
                anchor_sum,
                normalizable_sum,
                normalizable_count: classified.normalizable.len(),
                balancing_row_id: None,
                residual: 0.0,
                row_changes: Vec::new(),
                current_totals,
                new_totals: current_totals,
                warnings,
                data_quality_failures: classified.invalid_ids(),
                can_commit: false,
            };
        }

        // ==========================================
        // 步骤4: 逐行缩放 + 取整 + 非负截断
        // ==========================================
        let mut row_changes: Vec<RowChange> = classified
            .ordered
            .iter()
            .map(|(row, role)| {
                let mut change =
                    RowChange::unchanged(&row.id, row.display_name(), *role, row.quantity);
                change.max_percentage = row.max_percentage;
                if role.is_scaled() {
                    let scaled = apply_policy(row.quantity * factor.factor, &request.rounding);
                    change.set_new_quantity(clamp_non_negative(scaled));
                }
                change
            })
            .collect();

        // ==========================================
        // 步骤5: 残差对齐
        // ==========================================
        let (balancing_row_id, balancing_warnings) =
            reconcile::select_balancing_row(&classified.normalizable, &request.balancing);
        warnings.extend(balancing_warnings);

        let outcome = reconcile::reconcile(
            &mut row_changes,
            target_total,
            balancing_row_id.as_deref(),
            self.residual_epsilon,
        );
        warnings.extend(outcome.warnings);
        reconcile::refresh_percentages(&mut row_changes);

        // ==========================================
        // 步骤6: 合规评估（只追加）
        // ==========================================
        compliance::evaluate(&mut row_changes, &mut warnings);

        // ==========================================
        // 步骤7: 汇总 + 可提交判定
        // ==========================================
        let new_totals = Totals {
            amount: row_changes.iter().map(|c| c.new_quantity).sum(),
            cost: classified
                .ordered
                .iter()
                .zip(row_changes.iter())
                .map(|((row, _), change)| row.cost_at(change.new_quantity))
                .sum(),
        };
        let can_commit = projector::can_commit(
            &row_changes,
            classified.normalizable.len(),
            factor.factor,
            target_total,
            self.residual_epsilon,
        );

        info!(
            scale_factor = factor.factor,
            residual = outcome.residual,
            reconciled = outcome.adjusted,
            warnings = warnings.len(),
            can_commit,
            "缩放预览计算完成"
        );

        ScalingResult {
            formula_id: formula.formula_id.clone(),
            formula_revision: formula.revision,
            workflow: request.workflow,
            target_mode: request.target_mode,
            target_total,
            scale_factor: factor.factor,
            anchor_sum,
            normalizable_sum,
            normalizable_count: classified.normalizable.len(),
            balancing_row_id,
            residual: outcome.residual,
            row_changes,
            current_totals,
            new_totals,
            warnings,
            data_quality_failures: classified.invalid_ids(),
            can_commit,
        }
    }
}
