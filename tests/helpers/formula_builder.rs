// ==========================================
// 配方构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use formula_scaling::domain::formula::{
    Formula, FormulaEntry, FormulaRow, GroupMarker, IngredientRef,
};
use formula_scaling::domain::types::MassUnit;

// ==========================================
// FormulaRow 构建器
// ==========================================

pub struct RowBuilder {
    row: FormulaRow,
}

impl RowBuilder {
    pub fn new(id: &str, quantity: f64) -> Self {
        Self {
            row: FormulaRow {
                id: id.to_string(),
                quantity,
                concentration: 0.0,
                ingredient: Some(IngredientRef {
                    name: format!("ING-{}", id),
                    cost_per_unit: 0.0,
                }),
                is_locked: false,
                has_compliance_override: false,
                max_percentage: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        if let Some(ingredient) = self.row.ingredient.as_mut() {
            ingredient.name = name.to_string();
        }
        self
    }

    pub fn cost(mut self, cost_per_unit: f64) -> Self {
        if let Some(ingredient) = self.row.ingredient.as_mut() {
            ingredient.cost_per_unit = cost_per_unit;
        }
        self
    }

    pub fn locked(mut self) -> Self {
        self.row.is_locked = true;
        self
    }

    pub fn compliance_override(mut self) -> Self {
        self.row.has_compliance_override = true;
        self
    }

    pub fn max_percentage(mut self, max: f64) -> Self {
        self.row.max_percentage = Some(max);
        self
    }

    /// 缺少原料主数据
    pub fn without_ingredient(mut self) -> Self {
        self.row.ingredient = None;
        self
    }

    pub fn build(self) -> FormulaRow {
        self.row
    }
}

// ==========================================
// Formula 构建器
// ==========================================

pub struct FormulaBuilder {
    formula_id: String,
    revision: u32,
    entries: Vec<FormulaEntry>,
    batch_value: Option<f64>,
    batch_unit: Option<MassUnit>,
}

impl FormulaBuilder {
    pub fn new(formula_id: &str) -> Self {
        Self {
            formula_id: formula_id.to_string(),
            revision: 1,
            entries: Vec::new(),
            batch_value: None,
            batch_unit: None,
        }
    }

    pub fn revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    pub fn row(mut self, row: RowBuilder) -> Self {
        self.entries.push(FormulaEntry::Ingredient(row.build()));
        self
    }

    /// 快捷方式：普通可缩放行
    pub fn ingredient(self, id: &str, quantity: f64) -> Self {
        self.row(RowBuilder::new(id, quantity))
    }

    pub fn group(mut self, id: &str, name: &str) -> Self {
        self.entries.push(FormulaEntry::Group(GroupMarker {
            id: id.to_string(),
            name: name.to_string(),
            sub_formula_id: None,
        }));
        self
    }

    pub fn batch(mut self, value: f64, unit: MassUnit) -> Self {
        self.batch_value = Some(value);
        self.batch_unit = Some(unit);
        self
    }

    pub fn build(self) -> Formula {
        let total: f64 = self
            .entries
            .iter()
            .filter_map(|e| e.as_row())
            .map(|r| r.quantity)
            .sum();
        let entries = self
            .entries
            .into_iter()
            .map(|entry| match entry {
                FormulaEntry::Ingredient(mut row) => {
                    if total > 0.0 {
                        row.concentration = row.quantity / total * 100.0;
                    }
                    FormulaEntry::Ingredient(row)
                }
                group => group,
            })
            .collect();

        Formula {
            formula_id: self.formula_id.clone(),
            name: format!("Formula {}", self.formula_id),
            revision: self.revision,
            entries,
            batch_value: self.batch_value,
            batch_unit: self.batch_unit,
        }
    }
}

/// 两行 60g / 40g 的基础配方
pub fn two_row_formula() -> Formula {
    FormulaBuilder::new("F-001")
        .ingredient("R1", 60.0)
        .ingredient("R2", 40.0)
        .build()
}

/// 浮点比较
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
