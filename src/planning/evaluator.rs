use crate::planning::types::{Plan, StrategyEvaluation};

pub const FEASIBILITY_THRESHOLD: f32 = 0.3;
pub const TIME_PER_TASK_US: f32 = 10_000.0;

pub trait PlanEvaluator: Send + Sync {
    fn evaluate(&self, plan: &Plan) -> StrategyEvaluation;
}

/// Scores a plan from its aggregates alone. Time is a flat per-task overhead,
/// not a measurement.
#[derive(Debug, Clone, Default)]
pub struct DeterministicPlanEvaluator;

impl PlanEvaluator for DeterministicPlanEvaluator {
    fn evaluate(&self, plan: &Plan) -> StrategyEvaluation {
        let task_count = plan.task_count();
        StrategyEvaluation {
            expected_utility: plan.total_reward - plan.total_cost,
            risk_score: 1.0 - plan.success_probability,
            resource_cost: plan.total_cost,
            time_estimate_us: task_count as f32 * TIME_PER_TASK_US,
            feasible: task_count > 0 && plan.success_probability > FEASIBILITY_THRESHOLD,
        }
    }
}
