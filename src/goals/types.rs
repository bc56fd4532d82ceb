use serde::{Deserialize, Serialize};

use crate::types::Priority;

pub type GoalId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub description: String,
    pub priority: Priority,
    /// Fraction complete in `[0, 1]`.
    #[serde(default)]
    pub progress: f32,
    /// Expected value of reaching the goal.
    #[serde(default)]
    pub utility: f32,
    #[serde(default)]
    pub achieved: bool,
}

impl Goal {
    pub fn new(id: GoalId, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            priority,
            progress: 0.0,
            utility: 0.0,
            achieved: false,
        }
    }

    pub fn with_utility(mut self, utility: f32) -> Self {
        self.utility = utility;
        self
    }
}
