use serde::{Deserialize, Serialize};

use crate::types::{ActionId, ActionParams, Micros, Priority};

pub type PlanId = u32;
pub type TaskId = u32;

pub const MAX_TASK_DEPENDENCIES: usize = 8;

/// A scored candidate action produced by an external decision source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action_id: ActionId,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// Priority on the 0..=100 scale.
    pub priority: u32,
    #[serde(default)]
    pub params: Option<ActionParams>,
}

impl Decision {
    pub fn new(action_id: ActionId, confidence: f32, priority: u32) -> Self {
        Self {
            action_id,
            confidence,
            priority,
            params: None,
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = Some(params);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Active,
    Complete,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Active,
    Complete,
    Failed,
    Cancelled,
}

impl PlanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }
}

/// One schedulable unit of a plan. Read-only outside the crate; its status
/// only moves through `ActionExecutor::execute_task` and
/// `Planner::complete_task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) action_id: ActionId,
    pub(crate) priority: Priority,
    pub(crate) status: TaskStatus,
    pub(crate) cost_estimate: f32,
    pub(crate) reward_estimate: f32,
    #[serde(default)]
    pub(crate) dependencies: Vec<TaskId>,
    #[serde(default)]
    pub(crate) deadline: Option<Micros>,
    #[serde(default)]
    pub(crate) started_at: Option<Micros>,
    #[serde(default)]
    pub(crate) completed_at: Option<Micros>,
    #[serde(default)]
    pub(crate) params: Option<ActionParams>,
}

impl Task {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn action_id(&self) -> ActionId {
        self.action_id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn cost_estimate(&self) -> f32 {
        self.cost_estimate
    }

    pub fn reward_estimate(&self) -> f32 {
        self.reward_estimate
    }

    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub fn deadline(&self) -> Option<Micros> {
        self.deadline
    }

    pub fn started_at(&self) -> Option<Micros> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<Micros> {
        self.completed_at
    }

    pub fn params(&self) -> Option<&ActionParams> {
        self.params.as_ref()
    }
}

/// Caller-supplied description of a task appended after generation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSpec {
    pub action_id: ActionId,
    pub priority: Priority,
    pub cost_estimate: f32,
    pub reward_estimate: f32,
    pub dependencies: Vec<TaskId>,
    pub deadline: Option<Micros>,
    pub params: Option<ActionParams>,
}

impl TaskSpec {
    pub fn new(action_id: ActionId, priority: Priority) -> Self {
        Self {
            action_id,
            priority,
            ..Self::default()
        }
    }

    pub fn with_estimates(mut self, cost_estimate: f32, reward_estimate: f32) -> Self {
        self.cost_estimate = cost_estimate;
        self.reward_estimate = reward_estimate;
        self
    }

    pub fn depends_on(mut self, dependencies: impl IntoIterator<Item = TaskId>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = Some(params);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub(crate) id: PlanId,
    pub(crate) status: PlanStatus,
    pub(crate) tasks: Vec<Task>,
    pub(crate) max_tasks: usize,
    pub(crate) total_cost: f32,
    pub(crate) total_reward: f32,
    pub(crate) success_probability: f32,
    pub(crate) created_at: Micros,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyEvaluation {
    pub expected_utility: f32,
    pub risk_score: f32,
    pub resource_cost: f32,
    pub time_estimate_us: f32,
    pub feasible: bool,
}

/// Running counters. `plans_completed` and `plans_failed` count status
/// transitions, not plans: a plan whose finished task is completed again with
/// the opposite outcome moves between Complete and Failed and is counted in
/// both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerStats {
    pub plans_generated: u64,
    pub plans_completed: u64,
    pub plans_failed: u64,
    pub plans_cancelled: u64,
    pub active_plans: usize,
}
