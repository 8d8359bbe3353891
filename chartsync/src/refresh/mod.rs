/// Pure auto-refresh transitions.
pub mod machine;
/// Tokio driver owning the refresh timer.
pub mod scheduler;

pub use machine::{Action, Event, RefreshMachine, RefreshState};
pub use scheduler::AutoRefreshScheduler;
