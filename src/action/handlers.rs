use std::sync::Arc;

use crate::{
    action::{
        ports::ActionHandler,
        types::{HandlerResult, rollback_unsupported},
    },
    types::ActionId,
};

type ExecuteFn = dyn Fn(ActionId, Option<&serde_json::Value>) -> HandlerResult + Send + Sync;
type RollbackFn = dyn Fn(ActionId) -> HandlerResult + Send + Sync;

/// Handler assembled from plain closures.
#[derive(Clone)]
pub struct FnActionHandler {
    execute: Arc<ExecuteFn>,
    rollback: Option<Arc<RollbackFn>>,
}

impl FnActionHandler {
    pub fn new<F>(execute: F) -> Self
    where
        F: Fn(ActionId, Option<&serde_json::Value>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            execute: Arc::new(execute),
            rollback: None,
        }
    }

    pub fn with_rollback<F>(mut self, rollback: F) -> Self
    where
        F: Fn(ActionId) -> HandlerResult + Send + Sync + 'static,
    {
        self.rollback = Some(Arc::new(rollback));
        self
    }
}

impl ActionHandler for FnActionHandler {
    fn execute(&self, action_id: ActionId, params: Option<&serde_json::Value>) -> HandlerResult {
        (self.execute)(action_id, params)
    }

    fn supports_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    fn rollback(&self, action_id: ActionId) -> HandlerResult {
        match &self.rollback {
            Some(rollback) => rollback(action_id),
            None => Err(rollback_unsupported(action_id)),
        }
    }
}
