use crate::{
    action::types::{HandlerResult, rollback_unsupported},
    types::ActionId,
};

/// Capability behind one action id.
///
/// Rollback is keyed by action identity only; it never sees the parameters of
/// the execution being compensated, so implementations must be self-contained
/// and idempotent per action.
pub trait ActionHandler: Send + Sync {
    fn execute(&self, action_id: ActionId, params: Option<&serde_json::Value>) -> HandlerResult;

    fn supports_rollback(&self) -> bool {
        false
    }

    fn rollback(&self, action_id: ActionId) -> HandlerResult {
        Err(rollback_unsupported(action_id))
    }
}
