/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// Disabled or paused.
    #[default]
    Idle,
    /// Waiting for the next refresh.
    CountingDown {
        /// Whole seconds left; held at 0 while a load is in flight.
        seconds_remaining: u64,
    },
    /// A refresh fired and its load has not completed yet.
    Refreshing,
}

impl RefreshState {
    /// Seconds left, or 0 outside a countdown.
    #[must_use]
    pub const fn seconds_remaining(self) -> u64 {
        match self {
            Self::CountingDown { seconds_remaining } => seconds_remaining,
            Self::Idle | Self::Refreshing => 0,
        }
    }
}

/// Inputs to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// User toggled auto-refresh.
    SetEnabled(bool),
    /// Owner paused or resumed scheduling (rate limit countdowns).
    SetPaused(bool),
    /// A load started or completed.
    SetLoading(bool),
    /// One second elapsed.
    Tick,
    /// Restart the countdown from the full interval.
    Reset,
    /// Change the interval; restarts an active countdown.
    SetInterval(u64),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// (Re)arm the one-second timer.
    StartTimer,
    /// Clear the timer.
    StopTimer,
    /// Invoke the refresh callback.
    FireRefresh,
}

/// Pure auto-refresh scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshMachine {
    /// Countdown length in seconds.
    pub interval_seconds: u64,
    /// Auto-refresh toggle.
    pub enabled: bool,
    /// Externally imposed pause.
    pub paused: bool,
    /// Whether a load is in flight.
    pub loading: bool,
    /// Current state.
    pub state: RefreshState,
}

impl RefreshMachine {
    /// Disabled machine.
    #[must_use]
    pub const fn new(interval_seconds: u64) -> Self {
        Self {
            interval_seconds,
            enabled: false,
            paused: false,
            loading: false,
            state: RefreshState::Idle,
        }
    }

    /// True when the countdown should run.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.enabled && !self.paused
    }

    const fn restart(&mut self) -> Action {
        self.state = RefreshState::CountingDown {
            seconds_remaining: self.interval_seconds,
        };
        Action::StartTimer
    }

    /// Apply one event.
    #[must_use]
    pub fn handle(mut self, event: Event) -> (Self, Vec<Action>) {
        let was_active = self.is_active();
        let mut actions = Vec::new();
        match event {
            Event::SetEnabled(on) => {
                self.enabled = on;
                self.on_activity_change(was_active, &mut actions);
            }
            Event::SetPaused(on) => {
                self.paused = on;
                self.on_activity_change(was_active, &mut actions);
            }
            Event::SetLoading(on) => {
                self.loading = on;
                let waiting = matches!(
                    self.state,
                    RefreshState::Refreshing | RefreshState::CountingDown { seconds_remaining: 0 }
                );
                if !on && was_active && waiting {
                    actions.push(self.restart());
                }
            }
            Event::Tick => {
                if let (true, RefreshState::CountingDown { seconds_remaining }) =
                    (was_active, self.state)
                {
                    let next = seconds_remaining.saturating_sub(1);
                    if next > 0 {
                        self.state = RefreshState::CountingDown {
                            seconds_remaining: next,
                        };
                    } else if self.loading {
                        self.state = RefreshState::CountingDown {
                            seconds_remaining: 0,
                        };
                    } else {
                        self.state = RefreshState::Refreshing;
                        actions.push(Action::FireRefresh);
                    }
                }
            }
            Event::Reset => {
                if was_active {
                    actions.push(self.restart());
                }
            }
            Event::SetInterval(seconds) => {
                self.interval_seconds = seconds;
                if was_active {
                    actions.push(self.restart());
                }
            }
        }
        (self, actions)
    }

    fn on_activity_change(&mut self, was_active: bool, actions: &mut Vec<Action>) {
        match (was_active, self.is_active()) {
            (true, false) => {
                self.state = RefreshState::Idle;
                actions.push(Action::StopTimer);
            }
            (false, true) => actions.push(self.restart()),
            _ => {}
        }
    }
}
