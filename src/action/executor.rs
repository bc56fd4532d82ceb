use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    action::{
        history::ExecutionHistory,
        ports::ActionHandler,
        registry::ActionRegistry,
        types::{
            ActionRegistration, ActionStatus, ExecId, ExecutionOutcome, ExecutionRecord,
            ExecutorStats, RESULT_CODE_OK, RollbackOutcome,
        },
    },
    clock::{Clock, MonotonicClock},
    error::{PlanningError, invalid, invalid_state, not_found},
    planning::types::{Task, TaskStatus},
    types::{ActionId, Micros},
};

fn default_max_handlers() -> usize {
    32
}

fn default_max_history() -> usize {
    64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_max_handlers")]
    pub max_handlers: usize,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_handlers: default_max_handlers(),
            max_history: default_max_history(),
        }
    }
}

/// Runs actions synchronously through registered handlers.
///
/// Each call runs to completion on the calling thread. `timeout_ms` on a
/// registration is only compared after the fact and logged; a handler that
/// never returns blocks the caller.
pub struct ActionExecutor {
    registry: ActionRegistry,
    history: ExecutionHistory,
    clock: Arc<dyn Clock>,
    next_exec_id: ExecId,
    stats: ExecutorStats,
}

impl ActionExecutor {
    pub fn new(config: ExecutorConfig, clock: Arc<dyn Clock>) -> Result<Self, PlanningError> {
        Ok(Self {
            registry: ActionRegistry::new(config.max_handlers)?,
            history: ExecutionHistory::new(config.max_history)?,
            clock,
            next_exec_id: 1,
            stats: ExecutorStats::default(),
        })
    }

    pub fn with_defaults() -> Result<Self, PlanningError> {
        Self::new(ExecutorConfig::default(), Arc::new(MonotonicClock::new()))
    }

    pub fn register(
        &mut self,
        registration: ActionRegistration,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), PlanningError> {
        let action_id = registration.action_id;
        self.registry.register(registration, handler)?;
        tracing::debug!(target: "executor", action_id = action_id, "handler_registered");
        Ok(())
    }

    pub fn unregister(&mut self, action_id: ActionId) -> Result<ActionRegistration, PlanningError> {
        self.registry.unregister(action_id)
    }

    pub fn registration(&self, action_id: ActionId) -> Option<&ActionRegistration> {
        self.registry
            .resolve(action_id)
            .map(|item| &item.registration)
    }

    pub fn handler_count(&self) -> usize {
        self.registry.len()
    }

    /// Invokes the handler for `action_id` exactly once.
    ///
    /// `Err` means the executor could not run the action at all. A handler
    /// that ran and failed is reported through `ExecutionOutcome::result`
    /// with its own code, and is still recorded and counted.
    pub fn execute(
        &mut self,
        action_id: ActionId,
        params: Option<&serde_json::Value>,
    ) -> Result<ExecutionOutcome, PlanningError> {
        let (handler, timeout_ms) = {
            let item = self
                .registry
                .resolve(action_id)
                .ok_or_else(|| not_found(format!("no handler for action {}", action_id)))?;
            (Arc::clone(&item.handler), item.registration.timeout_ms)
        };

        let exec_id = self.next_exec_id;
        self.next_exec_id = self.next_exec_id.saturating_add(1);

        let started_at = self.clock.now_micros();
        let result = handler.execute(action_id, params);
        let completed_at = self.clock.now_micros();
        let duration = completed_at.saturating_sub(started_at);

        let (status, result_code) = match &result {
            Ok(()) => {
                self.stats.total_success = self.stats.total_success.saturating_add(1);
                (ActionStatus::Success, RESULT_CODE_OK)
            }
            Err(failure) => {
                self.stats.total_failed = self.stats.total_failed.saturating_add(1);
                (ActionStatus::Failed, failure.code)
            }
        };
        self.stats.total_executed = self.stats.total_executed.saturating_add(1);

        let record = ExecutionRecord {
            exec_id,
            action_id,
            status,
            started_at,
            completed_at,
            duration,
            result_code,
            rolled_back: false,
        };

        warn_if_over_timeout_hint(&record, timeout_ms);
        if let Some(evicted) = self.history.push(record.clone()) {
            tracing::trace!(
                target: "executor",
                evicted_exec_id = evicted.exec_id,
                "history_evicted"
            );
        }

        tracing::debug!(
            target: "executor",
            exec_id = exec_id,
            action_id = action_id,
            status = ?status,
            result_code = result_code,
            duration_us = duration,
            "action_executed"
        );

        Ok(ExecutionOutcome { record, result })
    }

    /// Runs a Pending task's action, moving it to Active and then to Complete
    /// or Failed. A task whose action has no handler ends Failed and the
    /// NotFound error is returned.
    pub fn execute_task(&mut self, task: &mut Task) -> Result<ExecutionOutcome, PlanningError> {
        if task.status != TaskStatus::Pending {
            return Err(invalid_state(format!(
                "task {} is {:?}, only pending tasks can run",
                task.id, task.status
            )));
        }

        task.status = TaskStatus::Active;
        task.started_at = Some(self.clock.now_micros());

        let outcome = self.execute(task.action_id, task.params.as_deref());

        task.completed_at = Some(self.clock.now_micros());
        task.status = match &outcome {
            Ok(outcome) if outcome.succeeded() => TaskStatus::Complete,
            Ok(_) | Err(_) => TaskStatus::Failed,
        };

        tracing::debug!(
            target: "executor",
            task_id = task.id,
            action_id = task.action_id,
            status = ?task.status,
            "task_executed"
        );
        outcome
    }

    /// Compensates a past execution by calling its handler's rollback with the
    /// action id alone.
    ///
    /// The record is only marked rolled back when the rollback handler
    /// succeeds; a failed rollback can be retried.
    pub fn rollback(&mut self, exec_id: ExecId) -> Result<RollbackOutcome, PlanningError> {
        let (action_id, rolled_back) = self
            .history
            .get(exec_id)
            .map(|record| (record.action_id, record.rolled_back))
            .ok_or_else(|| not_found(format!("execution {} not in history", exec_id)))?;

        if rolled_back {
            return Err(invalid_state(format!(
                "execution {} is already rolled back",
                exec_id
            )));
        }

        let handler = self
            .registry
            .resolve(action_id)
            .filter(|item| item.handler.supports_rollback())
            .map(|item| Arc::clone(&item.handler))
            .ok_or_else(|| {
                invalid(format!(
                    "action {} has no rollback handler registered",
                    action_id
                ))
            })?;

        let result = handler.rollback(action_id);

        let record = self
            .history
            .get_mut(exec_id)
            .ok_or_else(|| not_found(format!("execution {} not in history", exec_id)))?;
        if result.is_ok() {
            record.rolled_back = true;
            record.status = ActionStatus::RolledBack;
            self.stats.total_rollbacks = self.stats.total_rollbacks.saturating_add(1);
            tracing::info!(
                target: "executor",
                exec_id = exec_id,
                action_id = action_id,
                "rollback_applied"
            );
        } else {
            tracing::warn!(
                target: "executor",
                exec_id = exec_id,
                action_id = action_id,
                "rollback_handler_failed"
            );
        }

        Ok(RollbackOutcome {
            record: record.clone(),
            result,
        })
    }

    pub fn get_record(&self, exec_id: ExecId) -> Result<&ExecutionRecord, PlanningError> {
        self.history
            .get(exec_id)
            .ok_or_else(|| not_found(format!("execution {} not in history", exec_id)))
    }

    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    pub fn stats(&self) -> ExecutorStats {
        self.stats
    }
}

fn warn_if_over_timeout_hint(record: &ExecutionRecord, timeout_ms: u32) {
    if timeout_ms == 0 {
        return;
    }
    let budget: Micros = u64::from(timeout_ms) * 1_000;
    if record.duration > budget {
        tracing::warn!(
            target: "executor",
            exec_id = record.exec_id,
            action_id = record.action_id,
            duration_us = record.duration,
            timeout_ms = timeout_ms,
            "handler_exceeded_timeout_hint"
        );
    }
}
