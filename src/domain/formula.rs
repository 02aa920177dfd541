// ==========================================
// 配方编辑系统 - 配方领域模型
// ==========================================
// 职责: 配方快照、配方行、分组标记
// 红线: 配方为不可变值，提交时整体替换，不做字段级原地修改
// ==========================================

use crate::domain::types::MassUnit;
use serde::{Deserialize, Serialize};

// ==========================================
// IngredientRef - 原料主数据引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRef {
    pub name: String,       // 原料名称
    pub cost_per_unit: f64, // 单位成本（每基础单位）
}

// ==========================================
// FormulaRow - 配方行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaRow {
    // ===== 标识 =====
    pub id: String, // 行ID（稳定，不随重算变化）

    // ===== 用量 =====
    pub quantity: f64, // 用量（基础单位，通常为克）
    #[serde(default)]
    pub concentration: f64, // 占比（%），由用量派生

    // ===== 主数据 =====
    #[serde(default)]
    pub ingredient: Option<IngredientRef>,

    // ===== 行标记 =====
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub has_compliance_override: bool,
    #[serde(default)]
    pub max_percentage: Option<f64>, // 占比上限（%）
}

impl FormulaRow {
    /// 主数据存在性检查（仅做存在性，不校验主数据内容）
    pub fn has_valid_ingredient(&self) -> bool {
        self.ingredient
            .as_ref()
            .map(|i| !i.name.trim().is_empty())
            .unwrap_or(false)
    }

    /// 原料名称（缺失时回落到行ID）
    pub fn display_name(&self) -> &str {
        match &self.ingredient {
            Some(i) if !i.name.trim().is_empty() => &i.name,
            _ => &self.id,
        }
    }

    /// 给定用量下的成本
    pub fn cost_at(&self, quantity: f64) -> f64 {
        self.ingredient
            .as_ref()
            .map(|i| quantity * i.cost_per_unit)
            .unwrap_or(0.0)
    }
}

// ==========================================
// GroupMarker - 分组标记（引用嵌入的子配方）
// ==========================================
// 不参与缩放，原样透传
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMarker {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sub_formula_id: Option<String>,
}

// ==========================================
// FormulaEntry - 配方条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FormulaEntry {
    Ingredient(FormulaRow),
    Group(GroupMarker),
}

impl FormulaEntry {
    pub fn id(&self) -> &str {
        match self {
            FormulaEntry::Ingredient(row) => &row.id,
            FormulaEntry::Group(group) => &group.id,
        }
    }

    pub fn as_row(&self) -> Option<&FormulaRow> {
        match self {
            FormulaEntry::Ingredient(row) => Some(row),
            FormulaEntry::Group(_) => None,
        }
    }
}

// ==========================================
// Formula - 配方快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub formula_id: String,
    pub name: String,
    #[serde(default)]
    pub revision: u32, // 每次提交 +1，用于乐观锁
    pub entries: Vec<FormulaEntry>,
    #[serde(default)]
    pub batch_value: Option<f64>,
    #[serde(default)]
    pub batch_unit: Option<MassUnit>,
}

impl Formula {
    /// 可缩放行（过滤掉分组标记，保持原顺序）
    pub fn rows(&self) -> impl Iterator<Item = &FormulaRow> {
        self.entries.iter().filter_map(FormulaEntry::as_row)
    }

    /// 当前总量（所有可缩放行）
    pub fn total_amount(&self) -> f64 {
        self.rows().map(|r| r.quantity).sum()
    }

    /// 批量值换算到基础单位（未配置批量单位时按克处理）
    pub fn batch_value_in_base(&self) -> Option<f64> {
        self.batch_value
            .map(|v| self.batch_unit.unwrap_or_default().to_base(v))
    }

    pub fn find_row(&self, row_id: &str) -> Option<&FormulaRow> {
        self.rows().find(|r| r.id == row_id)
    }
}
