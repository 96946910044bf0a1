use super::*;
use crate::fixtures::harness;
use doc_core::CostLimit;
use doc_storage::User;

fn make_user(harness: &crate::fixtures::TestHarness, cost_accum: f64) -> doc_core::UserId {
    let mut user = User::new("reader@example.com", harness.ctx.now_ms());
    user.cost_accum = cost_accum;
    let id = user.id;
    harness.ctx.store.create_user(user).unwrap();
    id
}

#[test]
fn anonymous_callers_always_pass() {
    let h = harness();
    assert!(check(&h.ctx, None).is_ok());
    assert!(accumulate(&h.ctx, None, 5.0).is_ok());
}

#[test]
fn blocks_once_cost_meets_the_limit() {
    let mut cfg = doc_core::Config::default();
    cfg.cost_limit = CostLimit(0.0);
    let h = crate::fixtures::harness_with_config(cfg);
    let user_id = make_user(&h, 0.0);

    let err = check(&h.ctx, Some(user_id)).unwrap_err();
    assert_eq!(err.kind(), doc_core::DocErrorKind::CostLimitExceeded);
}

#[test]
fn accumulate_raises_the_running_total() {
    let h = harness();
    let user_id = make_user(&h, 0.0);
    assert!(check(&h.ctx, Some(user_id)).is_ok());

    accumulate(&h.ctx, Some(user_id), 0.2).unwrap();
    let user = h.ctx.store.get_user(user_id).unwrap();
    assert!((user.cost_accum - 0.2).abs() < f64::EPSILON);
}

#[test]
fn under_the_limit_passes() {
    let h = harness();
    let user_id = make_user(&h, 0.1);
    assert!(check(&h.ctx, Some(user_id)).is_ok());
}
