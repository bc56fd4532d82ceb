use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use planwright::{
    action::{
        ActionExecutor, ActionRegistration, ActionStatus, ExecutorConfig, FnActionHandler,
        HandlerFailure,
    },
    clock::ManualClock,
    error::PlanningErrorKind,
};
use serde_json::json;

use super::{FAILURE_CODE, counting, executor_with, failing, register, succeeding};

#[test]
fn given_success_and_failure_when_execute_then_stats_count_both() {
    let (mut executor, _) = executor_with(8);
    register(&mut executor, 1, succeeding());
    register(&mut executor, 2, failing());

    let ok = executor.execute(1, None).expect("action 1 should run");
    let failed = executor.execute(2, None).expect("action 2 should run");

    assert!(ok.succeeded());
    assert_eq!(ok.record.status, ActionStatus::Success);
    assert_eq!(ok.record.result_code, 0);

    assert!(!failed.succeeded());
    assert_eq!(failed.record.status, ActionStatus::Failed);
    assert_eq!(failed.record.result_code, FAILURE_CODE);
    let failure = failed.result.expect_err("handler failure is surfaced");
    assert_eq!(failure.code, FAILURE_CODE);

    let stats = executor.stats();
    assert_eq!(stats.total_executed, 2);
    assert_eq!(stats.total_success, 1);
    assert_eq!(stats.total_failed, 1);
    assert_eq!(stats.total_rollbacks, 0);
    assert_eq!(executor.history_count(), 2);
}

#[test]
fn given_registered_handler_when_execute_then_invoked_exactly_once() {
    let (mut executor, _) = executor_with(8);
    let calls = Arc::new(AtomicUsize::new(0));
    register(
        &mut executor,
        3,
        counting(Arc::clone(&calls), Arc::new(AtomicUsize::new(0))),
    );

    let outcome = executor.execute(3, None).expect("action should run");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(outcome.record.exec_id, 1);
    assert!(!outcome.record.rolled_back);
}

#[test]
fn given_unknown_action_when_execute_then_not_found_and_nothing_recorded() {
    let (mut executor, _) = executor_with(8);

    let err = executor.execute(9, None).expect_err("no handler registered");

    assert_eq!(err.kind, PlanningErrorKind::NotFound);
    assert_eq!(executor.history_count(), 0);
    assert_eq!(executor.stats().total_executed, 0);
}

#[test]
fn given_params_when_execute_then_handler_sees_them() {
    let (mut executor, _) = executor_with(8);
    register(
        &mut executor,
        4,
        FnActionHandler::new(|_, params| match params {
            Some(value) if value["target"] == "door" => Ok(()),
            _ => Err(HandlerFailure::new(7, "missing target")),
        }),
    );

    let with = executor
        .execute(4, Some(&json!({ "target": "door" })))
        .expect("action should run");
    let without = executor.execute(4, None).expect("action should run");

    assert!(with.succeeded());
    assert_eq!(without.record.result_code, 7);
}

#[test]
fn given_slow_handler_when_execute_then_duration_spans_clock_reads() {
    let clock = ManualClock::starting_at(0);
    let mut executor = ActionExecutor::new(ExecutorConfig::default(), Arc::new(clock.clone()))
        .expect("executor should build");
    let handler_clock = clock.clone();
    executor
        .register(
            ActionRegistration::new(5, "slow").with_timeout_ms(1),
            Arc::new(FnActionHandler::new(move |_, _| {
                handler_clock.advance(2_500);
                Ok(())
            })),
        )
        .expect("registration should succeed");

    let outcome = executor.execute(5, None).expect("slow action still completes");

    assert!(outcome.succeeded(), "timeout is advisory only");
    assert_eq!(outcome.record.started_at, 0);
    assert_eq!(outcome.record.completed_at, 2_500);
    assert_eq!(outcome.record.duration, 2_500);
}

#[test]
fn given_full_history_when_execute_then_oldest_record_is_evicted() {
    let (mut executor, _) = executor_with(2);
    register(&mut executor, 1, succeeding());

    let first = executor.execute(1, None).expect("run 1").record.exec_id;
    let second = executor.execute(1, None).expect("run 2").record.exec_id;
    let third = executor.execute(1, None).expect("run 3").record.exec_id;

    assert_eq!(executor.history_count(), 2);
    let err = executor
        .get_record(first)
        .expect_err("oldest record was evicted");
    assert_eq!(err.kind, PlanningErrorKind::NotFound);

    let kept: Vec<u64> = executor
        .history()
        .iter()
        .map(|record| record.exec_id)
        .collect();
    assert_eq!(kept, vec![second, third]);
    assert_eq!(executor.stats().total_executed, 3);
}

#[test]
fn given_duplicate_registration_when_register_then_invalid() {
    let (mut executor, _) = executor_with(2);
    register(&mut executor, 1, succeeding());

    let err = executor
        .register(
            ActionRegistration::new(1, "again"),
            Arc::new(succeeding()),
        )
        .expect_err("duplicate id must be rejected");
    assert_eq!(err.kind, PlanningErrorKind::Invalid);
    assert_eq!(executor.handler_count(), 1);
}

#[test]
fn given_unregistered_handler_when_execute_then_not_found() {
    let (mut executor, _) = executor_with(2);
    register(&mut executor, 1, succeeding());

    let removed = executor.unregister(1).expect("unregister should succeed");
    assert_eq!(removed.name, "action-1");

    let err = executor.execute(1, None).expect_err("handler is gone");
    assert_eq!(err.kind, PlanningErrorKind::NotFound);
    assert!(executor.registration(1).is_none());
}
