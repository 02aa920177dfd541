// ==========================================
// 集成测试辅助模块
// ==========================================

pub mod formula_builder;
