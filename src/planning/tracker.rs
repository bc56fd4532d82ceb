use crate::{
    error::PlanningError,
    planning::types::{Plan, PlanStatus, TaskId, TaskStatus},
    types::Micros,
};

pub struct CompletionTracker;

impl CompletionTracker {
    /// Marks a task terminal and re-aggregates the plan status.
    ///
    /// Repeating the call for an already-terminal task is accepted and only
    /// re-stamps `completed_at`. A Cancelled plan keeps its status.
    pub fn complete_task(
        plan: &mut Plan,
        task_id: TaskId,
        success: bool,
        now: Micros,
    ) -> Result<PlanStatus, PlanningError> {
        let task = plan.task_mut(task_id)?;
        task.status = if success {
            TaskStatus::Complete
        } else {
            TaskStatus::Failed
        };
        task.completed_at = Some(now);

        if let Some(status) = Self::aggregate(plan)
            && plan.status != PlanStatus::Cancelled
        {
            plan.status = status;
        }
        Ok(plan.status)
    }

    /// Terminal status implied by the tasks, or `None` while any is unresolved.
    pub fn aggregate(plan: &Plan) -> Option<PlanStatus> {
        let mut any_failed = false;
        for task in plan.tasks() {
            match task.status {
                TaskStatus::Pending | TaskStatus::Active => return None,
                TaskStatus::Failed => any_failed = true,
                TaskStatus::Complete => {}
            }
        }

        Some(if any_failed {
            PlanStatus::Failed
        } else {
            PlanStatus::Complete
        })
    }
}
