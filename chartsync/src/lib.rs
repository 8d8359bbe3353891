//! chartsync keeps a financial chart view synchronized with a rate-limited
//! market data service.
//!
//! Overview
//! - [`SyncOrchestrator`] owns one chart view: a full load on mount, cheap
//!   tail refreshes on a timer, and classified error handling.
//! - [`RateLimitRetryController`] turns a `429` into a visible countdown and
//!   a single automatic retry.
//! - [`AutoRefreshScheduler`] counts down to the next refresh, holding while
//!   a load is in flight.
//! - [`MarketHoursTicker`] republishes the exchange's open/close countdown
//!   every minute.
//!
//! Pure algorithms (indicators, merge, timezone and market-hours math) live
//! in `chartsync_core` and are re-exported here.
//!
//! Key behaviors
//! - Refresh plans: full (history + details in parallel) on mount, manual
//!   refresh and whenever nothing is displayed yet; lightweight (quote plus
//!   tail candles merged by timestamp) for auto-refresh ticks.
//! - Retries: rate limits wait out a countdown; server timeouts retry inline a
//!   bounded number of times; unclassified failures retry once after a short
//!   delay; not-found and empty-history errors are terminal.
//! - Background refresh failures never replace displayed data with an error.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use chartsync::{AssetRef, IndicatorSettings, SyncOrchestrator};
//! use chartsync_http::HttpDataService;
//!
//! let service = Arc::new(HttpDataService::new("http://localhost:8000")?);
//! let view = SyncOrchestrator::new(service, AssetRef::stock("AAPL"));
//! view.mount().await;
//! let points = view.chart(&IndicatorSettings::default(), "Europe/London");
//! ```
#![warn(missing_docs)]

mod countdown;
/// Exchange open/close ticker.
pub mod market_clock;
/// Auto-refresh scheduling.
pub mod refresh;
/// Rate-limit countdown and retry.
pub mod retry;
/// Chart view orchestration.
pub mod sync;
mod timer;

pub use chartsync_core::*;
pub use countdown::format_mm_ss;
pub use market_clock::MarketHoursTicker;
pub use refresh::{AutoRefreshScheduler, RefreshState};
pub use retry::{RateLimitRetryController, RetryState};
pub use sync::{
    RefreshPlan, RefreshTrigger, SyncOrchestrator, SyncOrchestratorBuilder, ViewError,
    ViewSnapshot,
};
