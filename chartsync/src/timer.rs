use tokio::task::JoinHandle;

/// Owner of at most one timer task.
///
/// Every arm or cancel bumps the generation; a timer task compares its own
/// generation before acting, so ticks from a replaced or cancelled timer are
/// ignored even if they were already in flight.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TimerSlot {
    pub(crate) const fn new() -> Self {
        Self {
            handle: None,
            generation: 0,
        }
    }

    /// Abort the current timer and reserve the generation for its replacement.
    pub(crate) fn begin(&mut self) -> u64 {
        self.cancel();
        self.generation
    }

    /// Store the task armed for the generation returned by `begin`.
    pub(crate) fn install(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.handle.replace(handle) {
            old.abort();
        }
    }

    /// Abort the current timer, if any.
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Release the handle of a timer that finished on its own, without aborting it.
    pub(crate) fn finish(&mut self) {
        self.handle = None;
    }

    pub(crate) const fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    #[cfg(test)]
    pub(crate) const fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replacing_aborts_and_invalidates_previous() {
        let mut slot = TimerSlot::new();
        let first = slot.begin();
        slot.install(tokio::spawn(std::future::pending()));
        assert!(slot.is_armed());

        let second = slot.begin();
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
        assert!(!slot.is_armed());

        slot.install(tokio::spawn(async {}));
        slot.cancel();
        assert!(!slot.is_current(second));
        assert!(!slot.is_armed());
    }

    #[tokio::test]
    async fn finish_keeps_generation() {
        let mut slot = TimerSlot::new();
        let g = slot.begin();
        slot.install(tokio::spawn(async {}));
        slot.finish();
        assert!(slot.is_current(g));
        assert!(!slot.is_armed());
    }
}
