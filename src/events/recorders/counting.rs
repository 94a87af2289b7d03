use crate::events::{Recorder, TimingEvent};

/// Success and failure tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingRecorder {
    pub successes: u64,
    pub failures: u64,
}

impl CountingRecorder {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }
}

impl<R> Recorder<R> for CountingRecorder {
    fn record(&mut self, event: &TimingEvent<R>) {
        if event.is_success() {
            self.successes = self.successes.saturating_add(1);
        } else {
            self.failures = self.failures.saturating_add(1);
        }
    }
}
