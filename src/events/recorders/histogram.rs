use std::fmt;
use std::time::Duration;

use hdrhistogram::Histogram;
use tokio::time::Instant;

use crate::args::PositiveU64;
use crate::error::MetricsError;
use crate::events::{Recorder, TimingEvent};

const SIGNIFICANT_FIGURES: u8 = 3;

/// Records `duration_nanos / scale` of every event in an HDR histogram and
/// tracks errors plus the observed span of the run.
///
/// A scale of `1_000_000` records milliseconds, `1_000` microseconds.
#[derive(Debug)]
pub struct HistogramRecorder {
    hist: Histogram<u64>,
    scale: u64,
    errors: u64,
    started: Option<Instant>,
    last_event: Option<Instant>,
}

/// Point-in-time view of a [`HistogramRecorder`], values in recorder units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSummary {
    pub count: u64,
    pub errors: u64,
    pub min: u64,
    pub mean: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
    pub max: u64,
    pub elapsed: Duration,
}

impl HistogramRecorder {
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new(scale: PositiveU64) -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(SIGNIFICANT_FIGURES).map_err(|err| {
            MetricsError::Histogram {
                context: "create",
                source: Box::new(err),
            }
        })?;
        Ok(Self {
            hist,
            scale: scale.get(),
            errors: 0,
            started: None,
            last_event: None,
        })
    }

    #[must_use]
    pub const fn histogram(&self) -> &Histogram<u64> {
        &self.hist
    }

    #[must_use]
    pub const fn errors(&self) -> u64 {
        self.errors
    }

    #[must_use]
    pub fn summary(&self) -> HistogramSummary {
        let elapsed = match (self.started, self.last_event) {
            (Some(started), Some(last)) => last.saturating_duration_since(started),
            _ => Duration::ZERO,
        };
        let empty = self.hist.is_empty();
        let pick = |value: u64| if empty { 0 } else { value };
        HistogramSummary {
            count: self.hist.len(),
            errors: self.errors,
            min: pick(self.hist.min()),
            mean: pick(self.hist.mean() as u64),
            p50: pick(self.hist.value_at_quantile(0.50)),
            p90: pick(self.hist.value_at_quantile(0.90)),
            p99: pick(self.hist.value_at_quantile(0.99)),
            p999: pick(self.hist.value_at_quantile(0.999)),
            max: pick(self.hist.max()),
            elapsed,
        }
    }
}

impl<R> Recorder<R> for HistogramRecorder {
    fn record(&mut self, event: &TimingEvent<R>) {
        let now = Instant::now();
        if self.started.is_none() {
            // First completion: back-date by its own duration to estimate the run start.
            let duration = Duration::from_nanos(event.duration_nanos());
            self.started = Some(now.checked_sub(duration).unwrap_or(now));
        }
        if !event.is_success() {
            self.errors = self.errors.saturating_add(1);
        }
        let value = event.duration_nanos().checked_div(self.scale).unwrap_or(0);
        self.hist.saturating_record(value);
        self.last_event = Some(now);
    }
}

impl fmt::Display for HistogramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Requests: {} ({} errors)", self.count, self.errors)?;
        writeln!(f, "Elapsed: {:.3}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "Min: {}", self.min)?;
        writeln!(f, "Mean: {}", self.mean)?;
        writeln!(f, "P50: {}", self.p50)?;
        writeln!(f, "P90: {}", self.p90)?;
        writeln!(f, "P99: {}", self.p99)?;
        writeln!(f, "P99.9: {}", self.p999)?;
        write!(f, "Max: {}", self.max)
    }
}
