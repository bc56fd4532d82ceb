use crate::{
    error::{PlanningError, invalid, invalid_state, not_found, overflow},
    planning::{
        scheduler::TaskScheduler,
        tracker::CompletionTracker,
        types::{MAX_TASK_DEPENDENCIES, Plan, PlanId, PlanStatus, Task, TaskId, TaskSpec, TaskStatus},
    },
    types::{Micros, clamp_unit},
};

impl Plan {
    pub(crate) fn new(id: PlanId, max_tasks: usize, created_at: Micros) -> Self {
        Self {
            id,
            status: PlanStatus::Pending,
            tasks: Vec::with_capacity(max_tasks),
            max_tasks,
            total_cost: 0.0,
            total_reward: 0.0,
            success_probability: 0.0,
            created_at,
        }
    }

    pub fn id(&self) -> PlanId {
        self.id
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }

    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    /// Mean reward estimate over the plan's tasks, 0 for an empty plan.
    pub fn success_probability(&self) -> f32 {
        self.success_probability
    }

    pub fn created_at(&self) -> Micros {
        self.created_at
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Fixed task capacity, set when the plan was generated.
    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    pub fn task(&self, task_id: TaskId) -> Result<&Task, PlanningError> {
        self.tasks
            .iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| not_found(format!("plan {} has no task {}", self.id, task_id)))
    }

    pub(crate) fn task_mut(&mut self, task_id: TaskId) -> Result<&mut Task, PlanningError> {
        let plan_id = self.id;
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| not_found(format!("plan {} has no task {}", plan_id, task_id)))
    }

    /// Lends a Pending task of a live plan to `ActionExecutor::execute_task`.
    pub fn task_for_execution(&mut self, task_id: TaskId) -> Result<&mut Task, PlanningError> {
        if self.status.is_terminal() {
            return Err(invalid_state(format!(
                "plan {} is {:?}, its tasks cannot run",
                self.id, self.status
            )));
        }

        let task = self.task_mut(task_id)?;
        if task.status != TaskStatus::Pending {
            return Err(invalid_state(format!(
                "task {} is {:?}, only pending tasks can run",
                task.id, task.status
            )));
        }
        Ok(task)
    }

    /// Appends a dependent subtask. Ids continue from the current task count.
    /// Estimates must be finite and are clamped into `[0, 1]`.
    pub fn add_task(&mut self, spec: TaskSpec) -> Result<TaskId, PlanningError> {
        if self.status.is_terminal() {
            return Err(invalid_state(format!(
                "cannot add task to plan {} in status {:?}",
                self.id, self.status
            )));
        }
        if spec.dependencies.len() > MAX_TASK_DEPENDENCIES {
            return Err(invalid(format!(
                "task declares {} dependencies, limit is {}",
                spec.dependencies.len(),
                MAX_TASK_DEPENDENCIES
            )));
        }

        if !spec.cost_estimate.is_finite() || !spec.reward_estimate.is_finite() {
            return Err(invalid(format!(
                "task estimates must be finite: cost={} reward={}",
                spec.cost_estimate, spec.reward_estimate
            )));
        }

        let task_id = self.push_task(Task {
            id: 0,
            action_id: spec.action_id,
            priority: spec.priority,
            status: TaskStatus::Pending,
            cost_estimate: clamp_unit(spec.cost_estimate),
            reward_estimate: clamp_unit(spec.reward_estimate),
            dependencies: spec.dependencies,
            deadline: spec.deadline,
            started_at: None,
            completed_at: None,
            params: spec.params,
        })?;
        self.refresh_success_probability();
        Ok(task_id)
    }

    pub fn next_task(&self) -> Result<&Task, PlanningError> {
        TaskScheduler::next_task(self)
    }

    pub fn complete_task(
        &mut self,
        task_id: TaskId,
        success: bool,
        now: Micros,
    ) -> Result<PlanStatus, PlanningError> {
        CompletionTracker::complete_task(self, task_id, success, now)
    }

    pub(crate) fn push_task(&mut self, mut task: Task) -> Result<TaskId, PlanningError> {
        if self.tasks.len() >= self.max_tasks {
            return Err(overflow(format!(
                "plan {} task list full: capacity={}",
                self.id, self.max_tasks
            )));
        }

        let task_id = TaskId::try_from(self.tasks.len() + 1)
            .map_err(|_| overflow("task id space exhausted"))?;
        task.id = task_id;
        self.total_cost += task.cost_estimate;
        self.total_reward += task.reward_estimate;
        self.tasks.push(task);
        Ok(task_id)
    }

    pub(crate) fn refresh_success_probability(&mut self) {
        self.success_probability = if self.tasks.is_empty() {
            0.0
        } else {
            clamp_unit(self.total_reward / self.tasks.len() as f32)
        };
    }
}
