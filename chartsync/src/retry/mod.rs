/// Tokio driver owning the countdown timer.
pub mod controller;
/// Pure countdown transitions.
pub mod machine;

pub use controller::RateLimitRetryController;
pub use machine::{RetryMachine, RetryState, TickOutcome};
