use serde::{Deserialize, Serialize};

use crate::types::{ActionId, Micros, Priority};

pub type ExecId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Idle,
    Running,
    Success,
    Failed,
    RolledBack,
    Timeout,
}

/// A handler's own business failure. Carried as data, never as a
/// structural error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerFailure {
    pub code: i32,
    pub message: String,
}

impl HandlerFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type HandlerResult = Result<(), HandlerFailure>;

/// Result code recorded for a successful invocation.
pub const RESULT_CODE_OK: i32 = 0;
pub const RESULT_CODE_ROLLBACK_UNSUPPORTED: i32 = -1;

pub fn rollback_unsupported(action_id: ActionId) -> HandlerFailure {
    HandlerFailure::new(
        RESULT_CODE_ROLLBACK_UNSUPPORTED,
        format!("action {} does not support rollback", action_id),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRegistration {
    pub action_id: ActionId,
    pub name: String,
    /// Advisory only; execution is never cancelled.
    #[serde(default)]
    pub timeout_ms: u32,
    #[serde(default)]
    pub min_priority: Priority,
}

impl ActionRegistration {
    pub fn new(action_id: ActionId, name: impl Into<String>) -> Self {
        Self {
            action_id,
            name: name.into(),
            timeout_ms: 0,
            min_priority: Priority::Low,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_min_priority(mut self, min_priority: Priority) -> Self {
        self.min_priority = min_priority;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub exec_id: ExecId,
    pub action_id: ActionId,
    pub status: ActionStatus,
    pub started_at: Micros,
    pub completed_at: Micros,
    pub duration: Micros,
    pub result_code: i32,
    pub rolled_back: bool,
}

/// What `execute` hands back: the stored record plus the handler's original
/// result, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub record: ExecutionRecord,
    pub result: HandlerResult,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOutcome {
    pub record: ExecutionRecord,
    pub result: HandlerResult,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorStats {
    pub total_executed: u64,
    pub total_success: u64,
    pub total_failed: u64,
    pub total_rollbacks: u64,
}
