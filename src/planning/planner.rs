use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    clock::{Clock, MonotonicClock},
    error::{PlanningError, invalid, invalid_state, not_found, overflow},
    goals::{Goal, GoalId, GoalStore},
    planning::{
        evaluator::{DeterministicPlanEvaluator, PlanEvaluator},
        replanner::Replanner,
        types::{
            Decision, Plan, PlanId, PlanStatus, PlannerStats, StrategyEvaluation, Task, TaskId,
            TaskStatus,
        },
    },
    types::{Priority, clamp_unit},
};

/// Decisions below this confidence are noise and never become tasks.
pub const NOISE_CONFIDENCE_FLOOR: f32 = 0.1;

/// Task headroom per generating decision, for dependent subtasks added later.
const TASK_CAPACITY_FACTOR: usize = 2;

fn default_max_plans() -> usize {
    16
}

fn default_max_goals() -> usize {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_max_plans")]
    pub max_plans: usize,
    #[serde(default = "default_max_goals")]
    pub max_goals: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_plans: default_max_plans(),
            max_goals: default_max_goals(),
        }
    }
}

/// Owns the plan table and goal store. Not internally synchronised; callers
/// serialise access.
pub struct Planner {
    config: PlannerConfig,
    clock: Arc<dyn Clock>,
    evaluator: Arc<dyn PlanEvaluator>,
    goals: GoalStore,
    plans: BTreeMap<PlanId, Plan>,
    stats: PlannerStats,
}

impl Planner {
    pub fn new(config: PlannerConfig, clock: Arc<dyn Clock>) -> Result<Self, PlanningError> {
        if config.max_plans == 0 {
            return Err(invalid("planner.max_plans must be at least 1"));
        }
        let goals = GoalStore::new(config.max_goals)?;

        Ok(Self {
            config,
            clock,
            evaluator: Arc::new(DeterministicPlanEvaluator),
            goals,
            plans: BTreeMap::new(),
            stats: PlannerStats::default(),
        })
    }

    pub fn with_defaults() -> Result<Self, PlanningError> {
        Self::new(PlannerConfig::default(), Arc::new(MonotonicClock::new()))
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn PlanEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<(), PlanningError> {
        self.goals.add_goal(goal)
    }

    pub fn remove_goal(&mut self, goal_id: GoalId) -> Result<Goal, PlanningError> {
        self.goals.remove_goal(goal_id)
    }

    pub fn update_goal(&mut self, goal_id: GoalId, progress: f32) -> Result<&Goal, PlanningError> {
        self.goals.update_goal(goal_id, progress)
    }

    pub fn get_goal(&self, goal_id: GoalId) -> Option<&Goal> {
        self.goals.get_goal(goal_id)
    }

    pub fn goals(&self) -> &GoalStore {
        &self.goals
    }

    /// Turns a decision batch into a new Active plan.
    ///
    /// Decisions under [`NOISE_CONFIDENCE_FLOOR`] are dropped; a batch that
    /// filters down to nothing still yields a valid, empty plan.
    pub fn generate(&mut self, decisions: &[Decision]) -> Result<PlanId, PlanningError> {
        if decisions.is_empty() {
            return Err(invalid("decision batch is empty"));
        }
        if self.plans.len() >= self.config.max_plans {
            return Err(overflow(format!(
                "plan table full: capacity={}",
                self.config.max_plans
            )));
        }

        let plan_id = PlanId::try_from(self.stats.plans_generated.saturating_add(1))
            .map_err(|_| overflow("plan id space exhausted"))?;
        let max_tasks = decisions
            .len()
            .checked_mul(TASK_CAPACITY_FACTOR)
            .ok_or_else(|| overflow("decision batch too large"))?;

        let mut plan = Plan::new(plan_id, max_tasks, self.clock.now_micros());
        let mut discarded = 0usize;
        for decision in decisions {
            if !decision.confidence.is_finite() || decision.confidence < NOISE_CONFIDENCE_FLOOR {
                discarded += 1;
                continue;
            }

            let confidence = clamp_unit(decision.confidence);
            plan.push_task(Task {
                id: 0,
                action_id: decision.action_id,
                priority: Priority::from_decision_scale(decision.priority),
                status: TaskStatus::Pending,
                cost_estimate: 1.0 - confidence,
                reward_estimate: confidence,
                dependencies: Vec::new(),
                deadline: None,
                started_at: None,
                completed_at: None,
                params: decision.params.clone(),
            })?;
        }
        plan.refresh_success_probability();
        plan.status = PlanStatus::Active;

        tracing::info!(
            target: "planner",
            plan_id = plan_id,
            task_count = plan.task_count(),
            discarded = discarded,
            total_cost = plan.total_cost,
            total_reward = plan.total_reward,
            success_probability = plan.success_probability,
            "plan_generated"
        );

        self.plans.insert(plan_id, plan);
        self.stats.plans_generated = self.stats.plans_generated.saturating_add(1);
        Ok(plan_id)
    }

    pub fn plan(&self, plan_id: PlanId) -> Result<&Plan, PlanningError> {
        self.plans
            .get(&plan_id)
            .ok_or_else(|| not_found(format!("unknown plan {}", plan_id)))
    }

    pub fn plan_mut(&mut self, plan_id: PlanId) -> Result<&mut Plan, PlanningError> {
        self.plans
            .get_mut(&plan_id)
            .ok_or_else(|| not_found(format!("unknown plan {}", plan_id)))
    }

    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }

    /// Drops a plan and its task list, freeing its table slot.
    pub fn release_plan(&mut self, plan_id: PlanId) -> Result<Plan, PlanningError> {
        let plan = self
            .plans
            .remove(&plan_id)
            .ok_or_else(|| not_found(format!("unknown plan {}", plan_id)))?;
        tracing::debug!(target: "planner", plan_id = plan_id, status = ?plan.status, "plan_released");
        Ok(plan)
    }

    pub fn next_task(&self, plan_id: PlanId) -> Result<&Task, PlanningError> {
        self.plan(plan_id)?.next_task()
    }

    /// Wraps [`Plan::complete_task`] with the planner clock and counts the
    /// plan's status transition, if any, in [`PlannerStats`].
    pub fn complete_task(
        &mut self,
        plan_id: PlanId,
        task_id: TaskId,
        success: bool,
    ) -> Result<PlanStatus, PlanningError> {
        let now = self.clock.now_micros();
        let plan = self.plan_mut(plan_id)?;
        let before = plan.status;
        let after = plan.complete_task(task_id, success, now)?;

        if before != after {
            match after {
                PlanStatus::Complete => {
                    self.stats.plans_completed = self.stats.plans_completed.saturating_add(1);
                }
                PlanStatus::Failed => {
                    self.stats.plans_failed = self.stats.plans_failed.saturating_add(1);
                }
                PlanStatus::Pending | PlanStatus::Active | PlanStatus::Cancelled => {}
            }
            tracing::info!(
                target: "planner",
                plan_id = plan_id,
                from = ?before,
                to = ?after,
                "plan_status_changed"
            );
        }
        Ok(after)
    }

    pub fn evaluate(&self, plan_id: PlanId) -> Result<StrategyEvaluation, PlanningError> {
        Ok(self.evaluator.evaluate(self.plan(plan_id)?))
    }

    /// Regenerates a fallback plan from the unresolved and failed tasks of
    /// `failed_plan_id`, then cancels the old plan.
    ///
    /// Confidence is discounted on every generation, so repeated replans of
    /// the same work eventually fall under the noise floor. How many times to
    /// replan is left to the caller. A Cancelled plan has already been
    /// replaced and is rejected with InvalidState.
    pub fn replan(&mut self, failed_plan_id: PlanId) -> Result<PlanId, PlanningError> {
        let failed_plan = self.plan(failed_plan_id)?;
        if failed_plan.status == PlanStatus::Cancelled {
            return Err(invalid_state(format!(
                "plan {} is already cancelled and cannot be replanned again",
                failed_plan_id
            )));
        }
        let decisions = Replanner::fallback_decisions(failed_plan)?;
        let plan_id = self.generate(&decisions)?;

        let failed_plan = self.plan_mut(failed_plan_id)?;
        failed_plan.status = PlanStatus::Cancelled;
        self.stats.plans_cancelled = self.stats.plans_cancelled.saturating_add(1);

        tracing::info!(
            target: "planner",
            failed_plan_id = failed_plan_id,
            plan_id = plan_id,
            carried_tasks = decisions.len(),
            "plan_replanned"
        );
        Ok(plan_id)
    }

    pub fn stats(&self) -> PlannerStats {
        PlannerStats {
            active_plans: self
                .plans
                .values()
                .filter(|plan| plan.status == PlanStatus::Active)
                .count(),
            ..self.stats
        }
    }
}
