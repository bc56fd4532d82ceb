pub mod executor;
pub mod handlers;
pub mod history;
pub mod ports;
pub mod registry;
pub mod types;

pub use executor::{ActionExecutor, ExecutorConfig};
pub use handlers::FnActionHandler;
pub use history::ExecutionHistory;
pub use ports::ActionHandler;
pub use registry::ActionRegistry;
pub use types::{
    ActionRegistration, ActionStatus, ExecId, ExecutionOutcome, ExecutionRecord, ExecutorStats,
    HandlerFailure, HandlerResult, RollbackOutcome,
};
