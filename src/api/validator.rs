// ==========================================
// 配方编辑系统 - 缩放请求校验器
// ==========================================
// 职责: 拦截调用方误用（非法步长、模式与工作流不匹配等）
// 说明: 引擎对非法输入也能给出尽力结果，校验只在 API 入口做
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::scaling::ScalingRequest;
use crate::domain::types::{BalancingMode, ScalingScope, TargetMode};

/// 校验缩放请求
///
/// 规则：
/// 1) 目标模式必须属于工作流允许的模式
/// 2) 取整步长为正的有限数
/// 3) absoluteAmount / yield 模式必须给出目标值，且为有限数
/// 4) manual 平衡模式必须指定行ID
/// 5) selectedRows 范围必须至少选中一行
pub fn validate_request(request: &ScalingRequest) -> ApiResult<()> {
    if !request.workflow.accepts(request.target_mode) {
        return Err(ApiError::InvalidInput(format!(
            "工作流 {} 不支持目标模式 {}",
            request.workflow, request.target_mode
        )));
    }

    let step = request.rounding.step;
    if !step.is_finite() || step <= 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "取整步长必须为正数: {}",
            step
        )));
    }

    if matches!(
        request.target_mode,
        TargetMode::AbsoluteAmount | TargetMode::Yield
    ) {
        match request.target_value {
            Some(v) if v.is_finite() => {}
            Some(v) => {
                return Err(ApiError::InvalidInput(format!("目标值无效: {}", v)));
            }
            None => {
                return Err(ApiError::InvalidInput(format!(
                    "{} 模式必须提供目标值",
                    request.target_mode
                )));
            }
        }
    }

    if !request.loss_factor_percent.is_finite() {
        return Err(ApiError::InvalidInput("损耗系数必须为有限数".to_string()));
    }

    if request.balancing.mode == BalancingMode::Manual
        && request
            .balancing
            .row_id
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
    {
        return Err(ApiError::InvalidInput(
            "manual 平衡模式必须指定平衡行".to_string(),
        ));
    }

    if request.scope == ScalingScope::SelectedRows && request.selected_row_ids.is_empty() {
        return Err(ApiError::InvalidInput(
            "selectedRows 范围至少需要选中一行".to_string(),
        ));
    }

    Ok(())
}
