use serde::{Deserialize, Serialize};

use crate::{
    action::ActionExecutor,
    error::PlanningError,
    planning::{PlanId, PlanStatus, Planner, TaskScheduler},
};

fn default_max_replan_depth() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_max_replan_depth")]
    pub max_replan_depth: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_replan_depth: default_max_replan_depth(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Failed with no replan budget left.
    Failed,
    /// Pending tasks remain but none can run, e.g. a dependency cycle.
    Stalled,
    /// The plan holds no tasks at all.
    Empty,
    /// Replanning discounted every carried task under the noise floor, so the
    /// failed work was dropped.
    Abandoned,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub final_plan_id: PlanId,
    pub plans_visited: Vec<PlanId>,
    pub replans: u32,
    pub executions: u64,
}

/// The owning loop: `next_task -> execute_task -> complete_task` until the
/// plan is terminal, then `replan` while a Failed plan has budget left.
#[derive(Debug, Clone, Default)]
pub struct PlanRunner {
    config: RunnerConfig,
}

impl PlanRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    #[tracing::instrument(name = "plan_run", target = "runner", skip(self, planner, executor))]
    pub fn run(
        &self,
        planner: &mut Planner,
        executor: &mut ActionExecutor,
        plan_id: PlanId,
    ) -> Result<RunReport, PlanningError> {
        let mut plan_id = plan_id;
        let mut plans_visited = vec![plan_id];
        let mut replans = 0u32;
        let mut executions = 0u64;

        let status = loop {
            match planner.plan(plan_id)?.status {
                PlanStatus::Complete => break RunStatus::Completed,
                PlanStatus::Cancelled => break RunStatus::Cancelled,
                PlanStatus::Failed => {
                    if replans >= self.config.max_replan_depth {
                        tracing::warn!(
                            target: "runner",
                            plan_id = plan_id,
                            replans = replans,
                            "replan_budget_exhausted"
                        );
                        break RunStatus::Failed;
                    }
                    plan_id = planner.replan(plan_id)?;
                    replans += 1;
                    plans_visited.push(plan_id);
                    continue;
                }
                PlanStatus::Pending | PlanStatus::Active => {}
            }

            let plan = planner.plan(plan_id)?;
            if plan.task_count() == 0 {
                if replans == 0 {
                    break RunStatus::Empty;
                }
                tracing::warn!(
                    target: "runner",
                    plan_id = plan_id,
                    replans = replans,
                    "plan_abandoned"
                );
                break RunStatus::Abandoned;
            }

            let task_id = match TaskScheduler::next_task(plan) {
                Ok(task) => task.id,
                Err(err) if err.is_not_found() => {
                    tracing::warn!(
                        target: "runner",
                        plan_id = plan_id,
                        blocked = TaskScheduler::blocked_tasks(plan).len(),
                        "plan_stalled"
                    );
                    break RunStatus::Stalled;
                }
                Err(err) => return Err(err),
            };

            let task = planner.plan_mut(plan_id)?.task_for_execution(task_id)?;
            let outcome = executor.execute_task(task);
            executions += 1;

            let success = match &outcome {
                Ok(outcome) => outcome.succeeded(),
                Err(err) if err.is_not_found() => {
                    tracing::warn!(
                        target: "runner",
                        plan_id = plan_id,
                        task_id = task_id,
                        error = %err,
                        "task_has_no_handler"
                    );
                    false
                }
                Err(err) => return Err(err.clone()),
            };

            planner.complete_task(plan_id, task_id, success)?;
        };

        tracing::info!(
            target: "runner",
            final_plan_id = plan_id,
            status = ?status,
            replans = replans,
            executions = executions,
            "plan_run_finished"
        );

        Ok(RunReport {
            status,
            final_plan_id: plan_id,
            plans_visited,
            replans,
            executions,
        })
    }
}
