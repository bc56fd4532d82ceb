use crate::{
    error::{PlanningError, invalid, not_found, overflow},
    goals::types::{Goal, GoalId},
    types::clamp_unit,
};

/// Bounded goal table.
///
/// Goal ids are not checked for uniqueness; callers that need unique ids must
/// enforce it themselves. Lookups resolve to the first goal with a matching id.
#[derive(Debug, Clone)]
pub struct GoalStore {
    capacity: usize,
    goals: Vec<Goal>,
}

impl GoalStore {
    pub fn new(capacity: usize) -> Result<Self, PlanningError> {
        if capacity == 0 {
            return Err(invalid("goal store capacity must be at least 1"));
        }
        Ok(Self {
            capacity,
            goals: Vec::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn add_goal(&mut self, goal: Goal) -> Result<(), PlanningError> {
        if self.goals.len() >= self.capacity {
            return Err(overflow(format!(
                "goal table full: capacity={}",
                self.capacity
            )));
        }

        tracing::debug!(
            target: "goals",
            goal_id = goal.id,
            priority = ?goal.priority,
            "goal_added"
        );
        self.goals.push(goal);
        Ok(())
    }

    pub fn remove_goal(&mut self, goal_id: GoalId) -> Result<Goal, PlanningError> {
        let index = self
            .goals
            .iter()
            .position(|goal| goal.id == goal_id)
            .ok_or_else(|| not_found(format!("unknown goal '{}'", goal_id)))?;
        Ok(self.goals.remove(index))
    }

    /// Records progress. `achieved` latches once progress reaches 1.0.
    pub fn update_goal(&mut self, goal_id: GoalId, progress: f32) -> Result<&Goal, PlanningError> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.id == goal_id)
            .ok_or_else(|| not_found(format!("unknown goal '{}'", goal_id)))?;

        if progress.is_nan() {
            return Err(invalid(format!("progress for goal '{}' is NaN", goal_id)));
        }

        goal.progress = clamp_unit(progress);
        if goal.progress >= 1.0 && !goal.achieved {
            goal.achieved = true;
            tracing::info!(target: "goals", goal_id = goal_id, "goal_achieved");
        }
        Ok(goal)
    }

    pub fn get_goal(&self, goal_id: GoalId) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == goal_id)
    }
}
