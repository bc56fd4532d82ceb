use std::{collections::BTreeMap, sync::Arc};

use crate::{
    action::{ports::ActionHandler, types::ActionRegistration},
    error::{PlanningError, invalid, not_found, overflow},
    types::ActionId,
};

pub struct RegisteredHandler {
    pub registration: ActionRegistration,
    pub handler: Arc<dyn ActionHandler>,
}

/// Bounded map of action id to handler.
pub struct ActionRegistry {
    capacity: usize,
    by_action: BTreeMap<ActionId, RegisteredHandler>,
}

impl ActionRegistry {
    pub fn new(capacity: usize) -> Result<Self, PlanningError> {
        if capacity == 0 {
            return Err(invalid("handler registry capacity must be at least 1"));
        }
        Ok(Self {
            capacity,
            by_action: BTreeMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.by_action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_action.is_empty()
    }

    pub fn register(
        &mut self,
        registration: ActionRegistration,
        handler: Arc<dyn ActionHandler>,
    ) -> Result<(), PlanningError> {
        if registration.name.trim().is_empty() {
            return Err(invalid(format!(
                "handler for action {} has an empty name",
                registration.action_id
            )));
        }
        if self.by_action.contains_key(&registration.action_id) {
            return Err(invalid(format!(
                "action {} already has a handler",
                registration.action_id
            )));
        }
        if self.by_action.len() >= self.capacity {
            return Err(overflow(format!(
                "handler registry full: capacity={}",
                self.capacity
            )));
        }

        self.by_action.insert(
            registration.action_id,
            RegisteredHandler {
                registration,
                handler,
            },
        );
        Ok(())
    }

    pub fn unregister(&mut self, action_id: ActionId) -> Result<ActionRegistration, PlanningError> {
        self.by_action
            .remove(&action_id)
            .map(|item| item.registration)
            .ok_or_else(|| not_found(format!("no handler for action {}", action_id)))
    }

    pub fn resolve(&self, action_id: ActionId) -> Option<&RegisteredHandler> {
        self.by_action.get(&action_id)
    }
}
