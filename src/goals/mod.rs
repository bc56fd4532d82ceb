pub mod store;
pub mod types;

pub use store::GoalStore;
pub use types::{Goal, GoalId};
