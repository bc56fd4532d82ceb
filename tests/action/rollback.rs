use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use planwright::{
    action::{ActionStatus, FnActionHandler, HandlerFailure},
    error::PlanningErrorKind,
};

use super::{counting, executor_with, register, succeeding};

#[test]
fn given_rollback_handler_when_rollback_then_record_is_marked() {
    let (mut executor, _) = executor_with(4);
    let rollbacks = Arc::new(AtomicUsize::new(0));
    register(
        &mut executor,
        1,
        counting(Arc::new(AtomicUsize::new(0)), Arc::clone(&rollbacks)),
    );
    let exec_id = executor.execute(1, None).expect("run").record.exec_id;

    let outcome = executor.rollback(exec_id).expect("rollback should succeed");

    assert!(outcome.result.is_ok());
    assert!(outcome.record.rolled_back);
    assert_eq!(outcome.record.status, ActionStatus::RolledBack);
    assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
    assert_eq!(executor.stats().total_rollbacks, 1);
    assert!(
        executor
            .get_record(exec_id)
            .expect("record still held")
            .rolled_back
    );
}

#[test]
fn given_rolled_back_record_when_rollback_again_then_invalid_state() {
    let (mut executor, _) = executor_with(4);
    let rollbacks = Arc::new(AtomicUsize::new(0));
    register(
        &mut executor,
        1,
        counting(Arc::new(AtomicUsize::new(0)), Arc::clone(&rollbacks)),
    );
    let exec_id = executor.execute(1, None).expect("run").record.exec_id;
    executor.rollback(exec_id).expect("first rollback");

    let err = executor
        .rollback(exec_id)
        .expect_err("second rollback must fail");

    assert_eq!(err.kind, PlanningErrorKind::InvalidState);
    assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
    assert_eq!(executor.stats().total_rollbacks, 1);
}

#[test]
fn given_handler_without_rollback_when_rollback_then_invalid() {
    let (mut executor, _) = executor_with(4);
    register(&mut executor, 1, succeeding());
    let exec_id = executor.execute(1, None).expect("run").record.exec_id;

    let err = executor
        .rollback(exec_id)
        .expect_err("no rollback registered");

    assert_eq!(err.kind, PlanningErrorKind::Invalid);
    assert!(
        !executor
            .get_record(exec_id)
            .expect("record still held")
            .rolled_back
    );
}

#[test]
fn given_unknown_exec_id_when_rollback_then_not_found() {
    let (mut executor, _) = executor_with(4);

    let err = executor.rollback(77).expect_err("unknown execution");
    assert_eq!(err.kind, PlanningErrorKind::NotFound);
}

#[test]
fn given_failing_rollback_when_rollback_then_record_stays_open_for_retry() {
    let (mut executor, _) = executor_with(4);
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    register(
        &mut executor,
        1,
        FnActionHandler::new(|_, _| Ok(())).with_rollback(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(HandlerFailure::new(3, "compensation unavailable"))
            } else {
                Ok(())
            }
        }),
    );
    let exec_id = executor.execute(1, None).expect("run").record.exec_id;

    let first = executor.rollback(exec_id).expect("rollback is attempted");
    assert_eq!(first.result.as_ref().map_err(|failure| failure.code), Err(3));
    assert!(!first.record.rolled_back);
    assert_eq!(executor.stats().total_rollbacks, 0);

    let second = executor.rollback(exec_id).expect("retry is allowed");
    assert!(second.record.rolled_back);
    assert_eq!(executor.stats().total_rollbacks, 1);
}
