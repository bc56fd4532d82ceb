use crate::{
    error::{PlanningError, not_found},
    planning::types::{Plan, Task, TaskStatus},
};

pub struct TaskScheduler;

impl TaskScheduler {
    /// Picks the highest-priority Pending task whose dependencies are all
    /// Complete, first in task order on ties.
    ///
    /// NotFound covers both "everything resolved" and "everything left is
    /// blocked". A dependency on an id the plan does not hold never resolves.
    pub fn next_task(plan: &Plan) -> Result<&Task, PlanningError> {
        let mut best: Option<&Task> = None;

        for task in plan.tasks() {
            if task.status != TaskStatus::Pending || !Self::dependencies_met(plan, task) {
                continue;
            }
            match best {
                Some(current) if task.priority <= current.priority => {}
                _ => best = Some(task),
            }
        }

        best.ok_or_else(|| not_found(format!("plan {} has no runnable task", plan.id)))
    }

    pub fn dependencies_met(plan: &Plan, task: &Task) -> bool {
        task.dependencies.iter().all(|dependency| {
            plan.tasks()
                .iter()
                .any(|other| other.id == *dependency && other.status == TaskStatus::Complete)
        })
    }

    /// Tasks still Pending whose dependencies can no longer be met right now.
    pub fn blocked_tasks(plan: &Plan) -> Vec<&Task> {
        plan.tasks()
            .iter()
            .filter(|task| task.status == TaskStatus::Pending && !Self::dependencies_met(plan, task))
            .collect()
    }
}
