use std::time::Duration;

use super::IntervalGenerator;

/// Fixed delay between dispatches: a strictly periodic target rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantInterval {
    interval_nanos: i64,
}

impl ConstantInterval {
    #[must_use]
    pub const fn new(interval_nanos: i64) -> Self {
        Self { interval_nanos }
    }

    #[must_use]
    pub fn from_duration(interval: Duration) -> Self {
        Self::new(i64::try_from(interval.as_nanos()).unwrap_or(i64::MAX))
    }

    /// Interval that dispatches `rate` requests per second.
    #[must_use]
    pub fn per_second(rate: u64) -> Self {
        let nanos = 1_000_000_000u64.checked_div(rate).unwrap_or(0);
        Self::new(i64::try_from(nanos).unwrap_or(i64::MAX))
    }
}

impl IntervalGenerator for ConstantInterval {
    fn next_interval(&mut self, _elapsed_nanos: u64) -> i64 {
        self.interval_nanos
    }
}
