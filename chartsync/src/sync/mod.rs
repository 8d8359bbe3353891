/// The per-view orchestrator.
pub mod orchestrator;
/// Pure planning and error-routing decisions.
pub mod policy;
/// Published view state.
pub mod state;

pub use orchestrator::{SyncOrchestrator, SyncOrchestratorBuilder};
pub use policy::{RefreshPlan, RefreshTrigger, RetryDirective, plan_refresh, retry_directive};
pub use state::{ViewError, ViewSnapshot};
