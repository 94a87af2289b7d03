//! Pacing functions for throughput-mode load tests.
//!
//! An interval generator maps the time elapsed since the start of a run to the
//! delay before the next request is dispatched. Negative delays are allowed;
//! the dispatch loop clamps them through its overage accounting.
mod constant;
mod exponential;


pub use constant::ConstantInterval;
pub use exponential::ExponentialInterval;

/// Produces the delay, in nanoseconds, before the next dispatch.
pub trait IntervalGenerator: Send {
    fn next_interval(&mut self, elapsed_nanos: u64) -> i64;
}

impl<F> IntervalGenerator for F
where
    F: FnMut(u64) -> i64 + Send,
{
    fn next_interval(&mut self, elapsed_nanos: u64) -> i64 {
        self(elapsed_nanos)
    }
}

/// Arrival process chosen at runtime (CLI and config driven runs).
#[derive(Debug, Clone)]
pub enum Arrival {
    Constant(ConstantInterval),
    Exponential(ExponentialInterval),
}

impl IntervalGenerator for Arrival {
    fn next_interval(&mut self, elapsed_nanos: u64) -> i64 {
        match self {
            Arrival::Constant(interval) => interval.next_interval(elapsed_nanos),
            Arrival::Exponential(interval) => interval.next_interval(elapsed_nanos),
        }
    }
}
