use std::time::Duration;

use chartsync_core::{ErrorKind, SyncConfig, SyncError};

/// Why a load was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTrigger {
    /// First load after mounting.
    InitialLoad,
    /// User asked for fresh data.
    Manual,
    /// The auto-refresh countdown fired.
    AutoRefresh,
    /// The rate-limit countdown completed.
    RateLimitRetry,
    /// Scheduled retry of an unclassified failure.
    ErrorRetry,
}

impl RefreshTrigger {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitialLoad => "initial-load",
            Self::Manual => "manual",
            Self::AutoRefresh => "auto-refresh",
            Self::RateLimitRetry => "rate-limit-retry",
            Self::ErrorRetry => "error-retry",
        }
    }
}

impl std::fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a load fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshPlan {
    /// History and details in parallel.
    Full,
    /// Quote plus tail candles, merged into the existing series.
    Lightweight,
}

impl RefreshPlan {
    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Lightweight => "lightweight",
        }
    }
}

impl std::fmt::Display for RefreshPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Choose the plan for a load.
///
/// ```
/// use chartsync::sync::{RefreshPlan, RefreshTrigger, plan_refresh};
///
/// assert_eq!(plan_refresh(RefreshTrigger::AutoRefresh, true, None), RefreshPlan::Lightweight);
/// assert_eq!(plan_refresh(RefreshTrigger::AutoRefresh, false, None), RefreshPlan::Full);
/// assert_eq!(
///     plan_refresh(RefreshTrigger::RateLimitRetry, true, Some(RefreshPlan::Lightweight)),
///     RefreshPlan::Lightweight
/// );
/// ```
#[must_use]
pub const fn plan_refresh(
    trigger: RefreshTrigger,
    has_data: bool,
    failed_plan: Option<RefreshPlan>,
) -> RefreshPlan {
    if !has_data {
        return RefreshPlan::Full;
    }
    match trigger {
        RefreshTrigger::InitialLoad | RefreshTrigger::Manual => RefreshPlan::Full,
        RefreshTrigger::AutoRefresh => RefreshPlan::Lightweight,
        RefreshTrigger::RateLimitRetry | RefreshTrigger::ErrorRetry => match failed_plan {
            Some(plan) => plan,
            None => RefreshPlan::Full,
        },
    }
}

/// How the orchestrator reacts to a failed call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryDirective {
    /// Hand off to the rate-limit countdown.
    Countdown {
        /// Server-suggested wait in seconds.
        wait_seconds: Option<f64>,
    },
    /// Already retried inline; report it.
    Exhausted,
    /// Retry once after a delay.
    RetryOnce {
        /// Delay before the retry.
        delay: Duration,
    },
    /// Never retry automatically.
    Terminal,
}

/// Map an error to its retry directive.
#[must_use]
pub fn retry_directive(err: &SyncError, config: &SyncConfig) -> RetryDirective {
    match err.kind() {
        ErrorKind::RateLimit => RetryDirective::Countdown {
            wait_seconds: err.retry_after(),
        },
        ErrorKind::ServerTimeout => RetryDirective::Exhausted,
        ErrorKind::SymbolNotFound | ErrorKind::EmptyHistory => RetryDirective::Terminal,
        ErrorKind::Unclassified => RetryDirective::RetryOnce {
            delay: config.unclassified_retry_delay,
        },
    }
}
