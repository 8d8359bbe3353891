use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chartsync_core::RefreshConfig;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::machine::{Action, Event, RefreshMachine, RefreshState};
use crate::countdown::format_mm_ss;
use crate::timer::TimerSlot;

type RefreshCallback = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    machine: RefreshMachine,
    timer: TimerSlot,
    on_refresh: Option<RefreshCallback>,
}

impl Inner {
    /// Run one transition and apply its timer actions. Returns whether the
    /// refresh callback is due.
    fn apply(&mut self, event: Event, shared: &Arc<Shared>) -> bool {
        let (next, actions) = self.machine.clone().handle(event);
        self.machine = next;
        let mut fire = false;
        for action in actions {
            match action {
                Action::StartTimer => {
                    let generation = self.timer.begin();
                    let weak = Arc::downgrade(shared);
                    self.timer
                        .install(tokio::spawn(run_ticker(weak, generation)));
                }
                Action::StopTimer => self.timer.cancel(),
                Action::FireRefresh => fire = true,
            }
        }
        fire
    }
}

struct Shared {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<RefreshState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drives periodic refreshes of a chart view.
///
/// The scheduler starts disabled; [`set_enabled`](Self::set_enabled) arms it.
/// Cloning is cheap and every clone drives the same countdown. Methods that
/// may arm the timer spawn onto the ambient Tokio runtime.
#[derive(Clone)]
pub struct AutoRefreshScheduler {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AutoRefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoRefreshScheduler")
            .field("machine", &self.shared.lock().machine)
            .finish_non_exhaustive()
    }
}

impl Default for AutoRefreshScheduler {
    fn default() -> Self {
        Self::new(&RefreshConfig::default())
    }
}

impl AutoRefreshScheduler {
    /// Disabled scheduler using the configured interval.
    #[must_use]
    pub fn new(config: &RefreshConfig) -> Self {
        let (state_tx, _) = watch::channel(RefreshState::Idle);
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    machine: RefreshMachine::new(config.interval.as_secs()),
                    timer: TimerSlot::new(),
                    on_refresh: None,
                }),
                state_tx,
            }),
        }
    }

    /// Install the handler invoked when a countdown completes.
    ///
    /// Replaces any previous handler; the latest one is used at fire time.
    pub fn set_on_refresh<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.lock().on_refresh = Some(Arc::new(f));
    }

    /// Remove the refresh handler.
    pub fn clear_on_refresh(&self) {
        self.shared.lock().on_refresh = None;
    }

    fn send(&self, event: Event) {
        let state = {
            let mut inner = self.shared.lock();
            // Only ticks can fire, and ticks come from the timer task.
            let _ = inner.apply(event, &self.shared);
            inner.machine.state
        };
        self.shared.state_tx.send_replace(state);
    }

    /// Turn auto-refresh on or off.
    pub fn set_enabled(&self, enabled: bool) {
        #[cfg(feature = "tracing")]
        tracing::debug!(enabled, "auto-refresh toggled");
        self.send(Event::SetEnabled(enabled));
    }

    /// Suspend or resume the countdown without changing the toggle.
    pub fn set_paused(&self, paused: bool) {
        self.send(Event::SetPaused(paused));
    }

    /// Report whether a load is in flight.
    pub fn set_loading(&self, loading: bool) {
        self.send(Event::SetLoading(loading));
    }

    /// Restart the countdown from the full interval.
    pub fn reset(&self) {
        self.send(Event::Reset);
    }

    /// Change the interval.
    pub fn set_interval(&self, interval: Duration) {
        self.send(Event::SetInterval(interval.as_secs()));
    }

    /// Disable, clear the pause and drop the handler.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        let _ = inner.apply(Event::SetEnabled(false), &self.shared);
        let _ = inner.apply(Event::SetPaused(false), &self.shared);
        inner.timer.cancel();
        inner.on_refresh = None;
        drop(inner);
        self.shared.state_tx.send_replace(RefreshState::Idle);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.shared.lock().machine.state
    }

    /// Whether the toggle is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.lock().machine.enabled
    }

    /// Whether scheduling is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.lock().machine.paused
    }

    /// True between a fired refresh and its load completing.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.state() == RefreshState::Refreshing
    }

    /// Seconds until the next refresh, or 0.
    #[must_use]
    pub fn seconds_remaining(&self) -> u64 {
        self.state().seconds_remaining()
    }

    /// Seconds until the next refresh rendered as `M:SS`.
    #[must_use]
    pub fn countdown_display(&self) -> String {
        format_mm_ss(self.seconds_remaining())
    }

    /// Watch every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
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
        let (fire, state) = {
            let mut inner = strong.lock();
            if !inner.timer.is_current(generation) {
                return;
            }
            let fire = inner.apply(Event::Tick, &strong);
            (fire, inner.machine.state)
        };
        strong.state_tx.send_replace(state);
        drop(strong);

        if fire {
            tokio::task::yield_now().await;
            let Some(strong) = shared.upgrade() else {
                return;
            };
            let callback = {
                let inner = strong.lock();
                if !inner.timer.is_current(generation) {
                    continue;
                }
                inner.on_refresh.clone()
            };
            drop(strong);
            #[cfg(feature = "tracing")]
            tracing::debug!("auto-refresh fired");
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}
