use chartsync_core::RetryConfig;

/// Countdown state published by the retry controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryState {
    /// No retry pending.
    #[default]
    Idle,
    /// Waiting out a rate limit.
    CountingDown {
        /// Whole seconds left before the retry fires.
        seconds_remaining: u64,
    },
}

impl RetryState {
    /// Seconds left, or 0 when idle.
    #[must_use]
    pub const fn seconds_remaining(self) -> u64 {
        match self {
            Self::Idle => 0,
            Self::CountingDown { seconds_remaining } => seconds_remaining,
        }
    }

    /// True while counting down.
    #[must_use]
    pub const fn is_counting_down(self) -> bool {
        matches!(self, Self::CountingDown { .. })
    }
}

/// Result of feeding one timer tick to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; carries the seconds left.
    Pending(u64),
    /// The countdown reached zero on this tick; the retry should fire.
    Expired,
    /// No countdown was running.
    Ignored,
}

/// Pure rate-limit countdown.
///
/// The machine never touches timers; the controller feeds it one tick per
/// second and acts on the returned [`TickOutcome`].
#[derive(Debug, Clone)]
pub struct RetryMachine {
    config: RetryConfig,
    state: RetryState,
}

impl RetryMachine {
    /// Idle machine with the given delays.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self {
            config,
            state: RetryState::Idle,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RetryState {
        self.state
    }

    /// Countdown length for a server-suggested wait.
    ///
    /// Missing or non-finite waits use the configured default; negative waits
    /// count as zero. The configured buffer is always added.
    ///
    /// ```
    /// use chartsync::retry::RetryMachine;
    /// use chartsync_core::RetryConfig;
    ///
    /// let m = RetryMachine::new(RetryConfig::default());
    /// assert_eq!(m.countdown_for(Some(5.0)), 6);
    /// assert_eq!(m.countdown_for(Some(4.2)), 6);
    /// assert_eq!(m.countdown_for(None), 61);
    /// assert_eq!(m.countdown_for(Some(f64::NAN)), 61);
    /// assert_eq!(m.countdown_for(Some(-3.0)), 1);
    /// ```
    #[must_use]
    pub fn countdown_for(&self, wait_seconds: Option<f64>) -> u64 {
        let wait = match wait_seconds {
            Some(w) if w.is_finite() => w.max(0.0),
            _ => self.config.default_delay.as_secs_f64(),
        };
        // Saturating float-to-int cast; waits are far below u64::MAX.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = wait.ceil() as u64;
        whole.saturating_add(self.config.buffer_seconds)
    }

    /// Begin (or restart) a countdown. Returns the seconds remaining.
    pub fn start(&mut self, wait_seconds: Option<f64>) -> u64 {
        let seconds_remaining = self.countdown_for(wait_seconds);
        self.state = RetryState::CountingDown { seconds_remaining };
        seconds_remaining
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            RetryState::Idle => TickOutcome::Ignored,
            RetryState::CountingDown { seconds_remaining } => {
                let next = seconds_remaining.saturating_sub(1);
                if next == 0 {
                    self.state = RetryState::Idle;
                    TickOutcome::Expired
                } else {
                    self.state = RetryState::CountingDown {
                        seconds_remaining: next,
                    };
                    TickOutcome::Pending(next)
                }
            }
        }
    }

    /// Drop any countdown without expiring it.
    pub const fn cancel(&mut self) {
        self.state = RetryState::Idle;
    }
}
