pub mod evaluator;
pub mod plan;
pub mod planner;
pub mod replanner;
pub mod scheduler;
pub mod tracker;
pub mod types;

pub use evaluator::{DeterministicPlanEvaluator, PlanEvaluator};
pub use planner::{Planner, PlannerConfig};
pub use replanner::Replanner;
pub use scheduler::TaskScheduler;
pub use tracker::CompletionTracker;
pub use types::{
    Decision, MAX_TASK_DEPENDENCIES, Plan, PlanId, PlanStatus, PlannerStats, StrategyEvaluation,
    Task, TaskId, TaskSpec, TaskStatus,
};
