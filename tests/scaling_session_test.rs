// ==========================================
// 缩放会话 / API 集成测试
// ==========================================
// 测试目标:
// 1) 会话状态机 Idle → Configuring → (Warned | Ready) → Committed
// 2) 数据质量阻断、告警确认门控、不可提交结果拒绝
// 3) 提交时的乐观锁（过期修订号拒绝）
// ==========================================

mod helpers;

use formula_scaling::api::{ApiError, ScalingApi, ScalingSession};
use formula_scaling::config::ScalingProfile;
use formula_scaling::domain::scaling::ScalingRequest;
use formula_scaling::domain::types::{MassUnit, ScalingWorkflow, SessionPhase};
use formula_scaling::engine::ScalingOrchestrator;
use formula_scaling::logging;
use formula_scaling::repository::FormulaStore;
use helpers::formula_builder::{approx_eq, two_row_formula, FormulaBuilder, RowBuilder};
use std::sync::Arc;

fn setup_api(formula: formula_scaling::domain::formula::Formula) -> ScalingApi {
    logging::init_test();
    let store = Arc::new(FormulaStore::new());
    store.insert(formula).expect("insert formula");
    ScalingApi::new(store, ScalingProfile::default())
}

// ==========================================
// 状态机
// ==========================================

#[test]
fn test_happy_path_commit() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .expect("open session");
    assert_eq!(session.phase(), SessionPhase::Configuring);

    let result = session
        .update(ScalingRequest::absolute(150.0, MassUnit::Gram))
        .expect("preview");
    assert!(result.can_commit);
    assert_eq!(session.phase(), SessionPhase::Ready);

    let outcome = api.commit_session(&mut session, "tester").expect("commit");
    assert_eq!(session.phase(), SessionPhase::Committed);
    assert_eq!(outcome.formula.revision, 2);
    assert!(approx_eq(outcome.formula.total_amount(), 150.0, 1e-9));

    assert_eq!(outcome.log.actor, "tester");
    assert_eq!(outcome.log.revision_before, 1);
    assert_eq!(outcome.log.revision_after, 2);
    assert_eq!(outcome.log.row_changes.len(), 2);
    assert!(approx_eq(outcome.log.amount_before, 100.0, 1e-9));
    assert!(approx_eq(outcome.log.amount_after, 150.0, 1e-9));
}

#[test]
fn test_update_before_open_is_rejected() {
    let formula = Arc::new(two_row_formula());
    let mut session = ScalingSession::new(
        formula,
        ScalingWorkflow::Normalize,
        ScalingOrchestrator::default(),
    );
    assert_eq!(session.phase(), SessionPhase::Idle);

    let err = session.update(ScalingRequest::normalize()).unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
}

#[test]
fn test_open_twice_is_rejected() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();
    assert!(matches!(
        session.open(),
        Err(ApiError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_commit_without_preview_is_rejected() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    let err = api.commit_session(&mut session, "tester").unwrap_err();
    assert!(matches!(err, ApiError::InvalidStateTransition { .. }));
    assert_eq!(session.phase(), SessionPhase::Configuring);
}

#[test]
fn test_committed_session_is_terminal() {
    let formula = Arc::new(two_row_formula());
    let mut session = ScalingSession::new(
        formula,
        ScalingWorkflow::Normalize,
        ScalingOrchestrator::default(),
    );
    session.open().unwrap();
    session
        .update(ScalingRequest::absolute(200.0, MassUnit::Gram))
        .unwrap();
    let outcome = session.commit("tester").unwrap();
    assert_eq!(outcome.formula.revision, 2);
    assert_eq!(session.phase(), SessionPhase::Committed);

    assert!(matches!(
        session.update(ScalingRequest::normalize()),
        Err(ApiError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        session.commit("tester"),
        Err(ApiError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_every_edit_recomputes_preview() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    session
        .update(ScalingRequest::absolute(200.0, MassUnit::Gram))
        .unwrap();
    assert!(approx_eq(session.result().unwrap().new_amount(), 200.0, 1e-9));

    session
        .update(ScalingRequest::absolute(50.0, MassUnit::Gram))
        .unwrap();
    assert!(approx_eq(session.result().unwrap().new_amount(), 50.0, 1e-9));
    assert_eq!(
        session.request().unwrap().target_value,
        Some(50.0)
    );
}

#[test]
fn test_preview_phase_is_never_observed_after_update() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    session
        .update(ScalingRequest::absolute(150.0, MassUnit::Gram))
        .unwrap();
    assert_eq!(session.phase(), SessionPhase::Ready);

    session
        .update(ScalingRequest::absolute(-5.0, MassUnit::Gram))
        .unwrap();
    assert_eq!(session.phase(), SessionPhase::Warned);

    // 校验失败时保持原阶段
    let zero_step = ScalingRequest::normalize().with_rounding(0.0, Default::default());
    assert!(session.update(zero_step).is_err());
    assert_eq!(session.phase(), SessionPhase::Warned);
    assert_ne!(session.phase(), SessionPhase::PreviewComputed);
}

// ==========================================
// 数据质量 / 请求校验
// ==========================================

#[test]
fn test_missing_ingredient_blocks_workflow() {
    let formula = FormulaBuilder::new("F-001")
        .ingredient("R1", 60.0)
        .row(RowBuilder::new("R2", 40.0).without_ingredient())
        .row(RowBuilder::new("R3", 5.0).locked().without_ingredient())
        .build();
    let api = setup_api(formula);

    match api.open_session("F-001", ScalingWorkflow::Normalize) {
        Err(ApiError::CannotNormalize { row_ids }) => {
            assert_eq!(row_ids, vec!["R2".to_string(), "R3".to_string()]);
        }
        other => panic!("Expected CannotNormalize, got {:?}", other.map(|s| s.phase())),
    }
}

#[test]
fn test_unknown_formula() {
    let api = setup_api(two_row_formula());
    assert!(matches!(
        api.open_session("F-404", ScalingWorkflow::Normalize),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn test_workflow_mismatch_rejected() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    let err = session
        .update(ScalingRequest::yield_target(100.0, MassUnit::Gram, 5.0))
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(session.phase(), SessionPhase::Configuring);
}

#[test]
fn test_invalid_requests_rejected() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    let zero_step = ScalingRequest::normalize().with_rounding(0.0, Default::default());
    assert!(matches!(
        session.update(zero_step),
        Err(ApiError::InvalidInput(_))
    ));

    let mut missing_value = ScalingRequest::absolute(1.0, MassUnit::Gram);
    missing_value.target_value = None;
    assert!(matches!(
        session.update(missing_value),
        Err(ApiError::InvalidInput(_))
    ));

    let empty_selection = ScalingRequest::normalize().with_selected_rows(Vec::<String>::new());
    assert!(matches!(
        session.update(empty_selection),
        Err(ApiError::InvalidInput(_))
    ));
}

// ==========================================
// 告警门控
// ==========================================

#[test]
fn test_warnings_require_acknowledgement() {
    let formula = FormulaBuilder::new("F-001")
        .row(RowBuilder::new("R1", 60.0).max_percentage(50.0))
        .ingredient("R2", 40.0)
        .build();
    let api = setup_api(formula);
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    session.update(ScalingRequest::normalize()).unwrap();
    assert_eq!(session.phase(), SessionPhase::Warned);

    let err = api.commit_session(&mut session, "tester").unwrap_err();
    assert!(matches!(err, ApiError::WarningsNotAcknowledged { count: 1 }));
    assert_eq!(session.phase(), SessionPhase::Warned);

    session.acknowledge_warnings().unwrap();
    assert_eq!(session.phase(), SessionPhase::Ready);

    let outcome = api.commit_session(&mut session, "tester").unwrap();
    assert_eq!(outcome.log.acknowledged_warnings.len(), 1);
    // 归一化不改变用量，审计日志不记录零变更行
    assert!(outcome.log.row_changes.is_empty());
}

#[test]
fn test_acknowledge_without_warnings_is_rejected() {
    let api = setup_api(two_row_formula());
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();
    session.update(ScalingRequest::normalize()).unwrap();
    assert_eq!(session.phase(), SessionPhase::Ready);

    assert!(matches!(
        session.acknowledge_warnings(),
        Err(ApiError::InvalidStateTransition { .. })
    ));
}

#[test]
fn test_uncommittable_result_rejected_even_when_acknowledged() {
    let formula = FormulaBuilder::new("F-001")
        .row(RowBuilder::new("R1", 60.0).locked())
        .row(RowBuilder::new("R2", 40.0).locked())
        .build();
    let api = setup_api(formula);
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    let result = session
        .update(ScalingRequest::absolute(150.0, MassUnit::Gram))
        .unwrap();
    assert!(!result.can_commit);
    assert_eq!(session.phase(), SessionPhase::Warned);

    session.acknowledge_warnings().unwrap();
    let err = api.commit_session(&mut session, "tester").unwrap_err();
    assert!(matches!(err, ApiError::CommitRejected(_)));
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[test]
fn test_collapsed_balancing_row_cannot_be_committed() {
    let formula = FormulaBuilder::new("F-001")
        .ingredient("A", 0.006)
        .ingredient("B", 0.006)
        .ingredient("C", 0.006)
        .build();
    let api = setup_api(formula);
    let mut session = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    let request = ScalingRequest::absolute(0.018, MassUnit::Gram)
        .with_rounding(0.01, formula_scaling::domain::types::RoundingMode::HalfUp);
    let result = session.update(request).unwrap();
    assert!(!result.can_commit);
    assert_eq!(session.phase(), SessionPhase::Warned);

    session.acknowledge_warnings().unwrap();
    let err = api.commit_session(&mut session, "tester").unwrap_err();
    assert!(matches!(err, ApiError::CommitRejected(_)));
}

// ==========================================
// 并发控制
// ==========================================

#[test]
fn test_stale_session_commit_rejected() {
    let api = setup_api(two_row_formula());

    let mut first = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();
    let mut second = api
        .open_session("F-001", ScalingWorkflow::Normalize)
        .unwrap();

    first
        .update(ScalingRequest::absolute(200.0, MassUnit::Gram))
        .unwrap();
    second
        .update(ScalingRequest::absolute(300.0, MassUnit::Gram))
        .unwrap();

    api.commit_session(&mut first, "alice").unwrap();
    let err = api.commit_session(&mut second, "bob").unwrap_err();
    match err {
        ApiError::StaleFormulaRevision {
            expected, actual, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("Expected StaleFormulaRevision, got {:?}", other),
    }
    assert_eq!(second.phase(), SessionPhase::Ready);
}

#[test]
fn test_commit_result_checks_revision() {
    let api = setup_api(two_row_formula());
    let request = ScalingRequest::absolute(120.0, MassUnit::Gram);

    let stale = api.preview("F-001", &request).unwrap();
    let fresh = api.preview("F-001", &request).unwrap();
    api.commit_result(&fresh, false, "alice").unwrap();

    assert!(matches!(
        api.commit_result(&stale, false, "bob"),
        Err(ApiError::StaleFormulaRevision { .. })
    ));
}

#[test]
fn test_commit_result_requires_acknowledgement() {
    let formula = FormulaBuilder::new("F-001")
        .row(RowBuilder::new("R1", 60.0).max_percentage(10.0))
        .ingredient("R2", 40.0)
        .build();
    let api = setup_api(formula);
    let result = api
        .preview("F-001", &ScalingRequest::absolute(200.0, MassUnit::Gram))
        .unwrap();

    assert!(matches!(
        api.commit_result(&result, false, "tester"),
        Err(ApiError::WarningsNotAcknowledged { .. })
    ));
    let outcome = api.commit_result(&result, true, "tester").unwrap();
    assert_eq!(outcome.formula.revision, 2);
}

#[test]
fn test_yield_session_uses_profile_defaults() {
    let formula = FormulaBuilder::new("F-001")
        .ingredient("R1", 120.0)
        .ingredient("R2", 80.0)
        .build();
    let store = Arc::new(FormulaStore::new());
    store.insert(formula).unwrap();
    let profile = ScalingProfile {
        default_loss_factor_percent: 10.0,
        ..ScalingProfile::default()
    };
    let api = ScalingApi::new(store.clone(), profile);

    let mut request = api.default_request(ScalingWorkflow::Yield);
    request.target_value = Some(100.0);

    let mut session = api
        .open_session("F-001", ScalingWorkflow::Yield)
        .unwrap();
    let result = session.update(request).unwrap();
    assert!(approx_eq(result.target_total, 110.0, 1e-9));

    api.commit_session(&mut session, "tester").unwrap();
    let stored = store.get("F-001").unwrap();
    assert_eq!(stored.revision, 2);
    assert!(approx_eq(stored.total_amount(), 110.0, 1e-9));
}
