use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chartsync_core::RetryConfig;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::machine::{RetryMachine, RetryState, TickOutcome};
use crate::countdown::format_mm_ss;
use crate::timer::TimerSlot;

type RetryCallback = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    machine: RetryMachine,
    timer: TimerSlot,
    on_retry: Option<RetryCallback>,
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<RetryState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: RetryState) {
        self.state_tx.send_replace(state);
    }
}

/// Counts down a server-suggested wait and fires a single automatic retry.
///
/// Cloning is cheap and every clone drives the same countdown. At most one
/// timer task exists per controller; it is aborted when a countdown is
/// replaced or cancelled and when the last clone is dropped.
///
/// Methods that start a countdown spawn onto the ambient Tokio runtime and
/// must be called from within one.
#[derive(Clone)]
pub struct RateLimitRetryController {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RateLimitRetryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitRetryController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Default for RateLimitRetryController {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RateLimitRetryController {
    /// Idle controller.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        let (state_tx, _) = watch::channel(RetryState::Idle);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine: RetryMachine::new(config),
                    timer: TimerSlot::new(),
                    on_retry: None,
                }),
                state_tx,
            }),
        }
    }

    /// Install the handler invoked when a countdown completes.
    ///
    /// Replaces any previous handler. The handler is looked up when the
    /// countdown fires, so a countdown started earlier calls the latest one.
    pub fn set_on_retry<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.lock().on_retry = Some(Arc::new(f));
    }

    /// Remove the retry handler.
    pub fn clear_on_retry(&self) {
        self.shared.lock().on_retry = None;
    }

    /// Start counting down `wait_seconds` (or the default) plus the buffer.
    ///
    /// Any running countdown is replaced without firing.
    pub fn start_countdown(&self, wait_seconds: Option<f64>) {
        let mut inner = self.shared.lock();
        let _seconds = inner.machine.start(wait_seconds);
        let generation = inner.timer.begin();
        let weak = Arc::downgrade(&self.shared);
        inner.timer.install(tokio::spawn(run_ticker(weak, generation)));
        let state = inner.machine.state();
        drop(inner);

        #[cfg(feature = "tracing")]
        tracing::info!(seconds = _seconds, wait = ?wait_seconds, "rate limited; retry countdown started");
        self.shared.publish(state);
    }

    /// Stop any countdown without invoking the handler.
    pub fn cancel(&self) {
        let mut inner = self.shared.lock();
        let was_counting = inner.machine.state().is_counting_down();
        inner.machine.cancel();
        inner.timer.cancel();
        drop(inner);

        if was_counting {
            #[cfg(feature = "tracing")]
            tracing::debug!("retry countdown cancelled");
        }
        self.shared.publish(RetryState::Idle);
    }

    /// Alias of [`cancel`](Self::cancel).
    pub fn reset(&self) {
        self.cancel();
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RetryState {
        self.shared.lock().machine.state()
    }

    /// True while a countdown is running.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.state().is_counting_down()
    }

    /// Seconds left, or 0 when idle.
    #[must_use]
    pub fn seconds_remaining(&self) -> u64 {
        self.state().seconds_remaining()
    }

    /// Seconds left rendered as `M:SS`.
    #[must_use]
    pub fn countdown_display(&self) -> String {
        format_mm_ss(self.seconds_remaining())
    }

    /// Watch every state change, including each tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RetryState> {
        self.shared.state_tx.subscribe()
    }
}

async fn run_ticker(shared: Weak<Shared>, generation: u64) {
    let period = Duration::from_secs(1);
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticks.tick().await;
        let Some(strong) = shared.upgrade() else {
            return;
        };
        let outcome = {
            let mut inner = strong.lock();
            if !inner.timer.is_current(generation) {
                return;
            }
            let outcome = inner.machine.tick();
            if outcome == TickOutcome::Expired {
                inner.timer.finish();
            }
            outcome
        };
        match outcome {
            TickOutcome::Pending(left) => {
                strong.publish(RetryState::CountingDown {
                    seconds_remaining: left,
                });
            }
            TickOutcome::Expired => {
                strong.publish(RetryState::Idle);
                drop(strong);
                fire(&shared, generation).await;
                return;
            }
            TickOutcome::Ignored => return,
        }
    }
}

/// Invoke the latest handler on the next scheduling turn, unless the
/// countdown was cancelled or replaced in between.
async fn fire(shared: &Weak<Shared>, generation: u64) {
    tokio::task::yield_now().await;
    let Some(strong) = shared.upgrade() else {
        return;
    };
    let callback = {
        let inner = strong.lock();
        if !inner.timer.is_current(generation) {
            return;
        }
        inner.on_retry.clone()
    };
    drop(strong);

    #[cfg(feature = "tracing")]
    tracing::info!(has_handler = callback.is_some(), "retry countdown finished");
    if let Some(callback) = callback {
        callback();
    }
}
