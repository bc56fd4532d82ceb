use std::sync::Arc;

use planwright::{
    error::PlanningErrorKind,
    planning::{PlanStatus, Planner, PlannerConfig, TaskSpec, TaskStatus},
    types::Priority,
};

use super::{assert_close, decision, planner_with};

#[test]
fn given_noise_decision_when_generate_then_only_confident_task_is_planned() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(10, 0.9, 80), decision(20, 0.05, 10)])
        .expect("generate should succeed");

    let plan = planner.plan(plan_id).expect("plan should exist");
    assert_eq!(plan.task_count(), 1);
    assert_close(plan.total_reward(), 0.9);
    assert_close(plan.total_cost(), 0.1);
    assert_close(plan.success_probability(), 0.9);

    let task = &plan.tasks()[0];
    assert_eq!(task.id(), 1);
    assert_eq!(task.action_id(), 10);
    assert_eq!(task.priority(), Priority::Critical);
    assert_eq!(task.status(), TaskStatus::Pending);
    assert!(task.dependencies().is_empty());
}

#[test]
fn given_mixed_batch_when_generate_then_tasks_keep_input_order_and_aggregates_sum() {
    let (mut planner, clock) = planner_with(4);
    clock.set(42);
    let decisions = [
        decision(1, 0.5, 0),
        decision(2, 0.09, 100),
        decision(3, 0.1, 40),
        decision(4, 1.0, 60),
    ];

    let plan_id = planner.generate(&decisions).expect("generate should succeed");
    let plan = planner.plan(plan_id).expect("plan should exist");

    let actions: Vec<u32> = plan.tasks().iter().map(|task| task.action_id()).collect();
    assert_eq!(actions, vec![1, 3, 4]);
    let ids: Vec<u32> = plan.tasks().iter().map(|task| task.id()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(plan.tasks()[1].priority(), Priority::High);
    assert_eq!(plan.tasks()[2].priority(), Priority::High);

    assert_close(plan.total_reward(), 0.5 + 0.1 + 1.0);
    assert_close(plan.total_cost(), 0.5 + 0.9 + 0.0);
    assert_close(plan.success_probability(), (0.5 + 0.1 + 1.0) / 3.0);
    assert_eq!(plan.status(), PlanStatus::Active);
    assert_eq!(plan.created_at(), 42);
    assert_eq!(plan.max_tasks(), 8);
}

#[test]
fn given_all_noise_when_generate_then_empty_plan_is_valid() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.01, 50), decision(2, 0.0, 50)])
        .expect("an all-noise batch is not an error");

    let plan = planner.plan(plan_id).expect("plan should exist");
    assert_eq!(plan.task_count(), 0);
    assert_eq!(plan.success_probability(), 0.0);
    assert_eq!(plan.status(), PlanStatus::Active);
}

#[test]
fn given_non_finite_confidence_when_generate_then_decision_is_treated_as_noise() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, f32::NAN, 50), decision(2, 0.6, 50)])
        .expect("generate should succeed");

    let plan = planner.plan(plan_id).expect("plan should exist");
    assert_eq!(plan.task_count(), 1);
    assert!((0.0..=1.0).contains(&plan.success_probability()));
}

#[test]
fn given_empty_batch_when_generate_then_invalid() {
    let (mut planner, _) = planner_with(4);
    let err = planner.generate(&[]).expect_err("empty batch must fail");
    assert_eq!(err.kind, PlanningErrorKind::Invalid);
    assert_eq!(planner.stats().plans_generated, 0);
}

#[test]
fn given_full_plan_table_when_generate_then_overflow_until_release() {
    let (mut planner, _) = planner_with(2);
    let first = planner
        .generate(&[decision(1, 0.8, 50)])
        .expect("first plan should fit");
    let second = planner
        .generate(&[decision(2, 0.8, 50)])
        .expect("second plan should fit");
    assert_eq!((first, second), (1, 2));

    let err = planner
        .generate(&[decision(3, 0.8, 50)])
        .expect_err("third plan must overflow");
    assert_eq!(err.kind, PlanningErrorKind::Overflow);

    planner.release_plan(first).expect("release should succeed");
    let third = planner
        .generate(&[decision(3, 0.8, 50)])
        .expect("released slot should be reusable");
    assert_eq!(third, 3);
    assert_eq!(planner.stats().plans_generated, 3);
    assert_eq!(
        planner
            .plan(first)
            .expect_err("released plan is gone")
            .kind,
        PlanningErrorKind::NotFound
    );
}

#[test]
fn given_zero_capacity_when_build_planner_then_invalid() {
    let err = Planner::new(
        PlannerConfig {
            max_plans: 0,
            max_goals: 1,
        },
        Arc::new(planwright::clock::ManualClock::default()),
    )
    .err()
    .expect("zero plan capacity must fail");
    assert_eq!(err.kind, PlanningErrorKind::Invalid);
}

#[test]
fn given_generated_plan_when_add_task_then_capacity_is_twice_the_batch() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.6, 50)])
        .expect("generate should succeed");
    let plan = planner.plan_mut(plan_id).expect("plan should exist");

    let subtask = plan
        .add_task(
            TaskSpec::new(7, Priority::Normal)
                .with_estimates(0.2, 0.8)
                .depends_on([1]),
        )
        .expect("headroom should admit one subtask");
    assert_eq!(subtask, 2);
    assert_close(plan.total_reward(), 1.4);
    assert_close(plan.total_cost(), 0.6);
    assert_close(plan.success_probability(), 0.7);

    let err = plan
        .add_task(TaskSpec::new(8, Priority::Low))
        .expect_err("third task exceeds 2x capacity");
    assert_eq!(err.kind, PlanningErrorKind::Overflow);
}

#[test]
fn given_too_many_dependencies_when_add_task_then_invalid() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.6, 50), decision(2, 0.6, 50)])
        .expect("generate should succeed");
    let plan = planner.plan_mut(plan_id).expect("plan should exist");

    let err = plan
        .add_task(TaskSpec::new(3, Priority::Low).depends_on(1..=9))
        .expect_err("nine dependencies exceed the limit");
    assert_eq!(err.kind, PlanningErrorKind::Invalid);
    assert_eq!(plan.task_count(), 2);
}

#[test]
fn given_params_on_decision_when_generate_then_task_shares_the_same_payload() {
    let (mut planner, _) = planner_with(4);
    let params = Arc::new(serde_json::json!({"target": "valve-3"}));
    let plan_id = planner
        .generate(&[decision(1, 0.7, 50).with_params(Arc::clone(&params))])
        .expect("generate should succeed");

    let task = planner
        .plan(plan_id)
        .expect("plan should exist")
        .task(1)
        .expect("task should exist");
    let shared = task.params().expect("params should be carried");
    assert!(Arc::ptr_eq(shared, &params));
}

#[test]
fn given_non_finite_estimate_when_add_task_then_invalid() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.6, 50), decision(2, 0.6, 50)])
        .expect("generate should succeed");
    let plan = planner.plan_mut(plan_id).expect("plan should exist");

    for (cost, reward) in [(0.1, f32::NAN), (f32::INFINITY, 0.5)] {
        let err = plan
            .add_task(TaskSpec::new(3, Priority::Low).with_estimates(cost, reward))
            .expect_err("non-finite estimates must be rejected");
        assert_eq!(err.kind, PlanningErrorKind::Invalid);
    }

    assert_eq!(plan.task_count(), 2);
    assert_close(plan.total_reward(), 1.2);
    assert_close(plan.success_probability(), 0.6);
}

#[test]
fn given_out_of_range_estimates_when_add_task_then_both_are_clamped() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.6, 50)])
        .expect("generate should succeed");
    let plan = planner.plan_mut(plan_id).expect("plan should exist");

    let task_id = plan
        .add_task(TaskSpec::new(2, Priority::Low).with_estimates(-2.0, 3.0))
        .expect("subtask should fit");

    let task = plan.task(task_id).expect("task should exist");
    assert_eq!(task.cost_estimate(), 0.0);
    assert_eq!(task.reward_estimate(), 1.0);
    assert_close(plan.total_cost(), 0.4);
    assert_close(plan.success_probability(), 0.8);
}

#[test]
fn given_terminal_plan_when_add_task_then_invalid_state() {
    let (mut planner, _) = planner_with(4);
    let plan_id = planner
        .generate(&[decision(1, 0.6, 50)])
        .expect("generate should succeed");
    planner
        .complete_task(plan_id, 1, true)
        .expect("complete should succeed");

    let plan = planner.plan_mut(plan_id).expect("plan should exist");
    assert_eq!(plan.status(), PlanStatus::Complete);
    let err = plan
        .add_task(TaskSpec::new(2, Priority::High))
        .expect_err("a finished plan takes no new work");
    assert_eq!(err.kind, PlanningErrorKind::InvalidState);
    assert_eq!(plan.task_count(), 1);
}
