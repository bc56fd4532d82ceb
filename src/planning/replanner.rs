use crate::{
    error::{PlanningError, not_found},
    planning::types::{Decision, Plan, TaskStatus},
};

/// Trust kept per replan generation. Compounds across repeated replans.
pub const REPLAN_CONFIDENCE_DISCOUNT: f32 = 0.8;

pub struct Replanner;

impl Replanner {
    /// Synthesises one decision per Pending or Failed task, in task order.
    pub fn fallback_decisions(plan: &Plan) -> Result<Vec<Decision>, PlanningError> {
        let decisions: Vec<Decision> = plan
            .tasks()
            .iter()
            .filter(|task| matches!(task.status, TaskStatus::Pending | TaskStatus::Failed))
            .map(|task| Decision {
                action_id: task.action_id,
                confidence: task.reward_estimate * REPLAN_CONFIDENCE_DISCOUNT,
                priority: task.priority.to_decision_scale(),
                params: task.params.clone(),
            })
            .collect();

        if decisions.is_empty() {
            return Err(not_found(format!(
                "plan {} has no pending or failed task to replan",
                plan.id
            )));
        }
        Ok(decisions)
    }
}
