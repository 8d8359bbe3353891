use std::sync::Arc;
use std::time::Duration;

use chartsync_core::market_hours::{ExchangeProfile, MarketStatus, market_status};
use chartsync_core::{Clock, Tz};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How often the market status is recomputed.
pub const MARKET_TICK: Duration = Duration::from_secs(60);

/// Publishes the open/close countdown of one exchange, recomputed every minute.
///
/// The first status is computed synchronously on spawn. The task stops when
/// the ticker is dropped.
#[derive(Debug)]
pub struct MarketHoursTicker {
    rx: watch::Receiver<Option<MarketStatus>>,
    handle: JoinHandle<()>,
}

impl MarketHoursTicker {
    /// Start ticking for `profile` as seen from `viewer_zone`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(profile: ExchangeProfile, viewer_zone: Tz, clock: Arc<dyn Clock>) -> Self {
        let initial = market_status(&profile, clock.now(), viewer_zone);
        let (tx, rx) = watch::channel(initial);
        let handle = tokio::spawn(async move {
            let mut ticks =
                tokio::time::interval_at(tokio::time::Instant::now() + MARKET_TICK, MARKET_TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                let status = market_status(&profile, clock.now(), viewer_zone);
                #[cfg(feature = "tracing")]
                tracing::trace!(exchange = profile.name, open = status.as_ref().is_some_and(|s| s.is_open), "market status recomputed");
                if tx.send(status).is_err() {
                    return;
                }
            }
        });
        Self { rx, handle }
    }

    /// Latest status; `None` when the profile never trades.
    #[must_use]
    pub fn current(&self) -> Option<MarketStatus> {
        self.rx.borrow().clone()
    }

    /// Watch every recompute.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<MarketStatus>> {
        self.rx.clone()
    }
}

impl Drop for MarketHoursTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
