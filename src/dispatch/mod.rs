//! The dispatch engine.
//!
//! Two ways to drive a target:
//!
//! - [`load_test_throughput`] paces dispatches with an
//!   [`IntervalGenerator`](crate::intervals::IntervalGenerator) and lets
//!   concurrency grow as needed. Time the loop itself spends between sleeps is
//!   tracked as overage and paid back by shortening later sleeps, so the long
//!   run rate stays on target.
//! - [`load_test_concurrency`] keeps at most `concurrency` requests in flight
//!   and dispatches as fast as permits free up.
//!
//! Both spawn one task per request, skip reporting for the first `warmup`
//! requests, drain every in-flight request once the source ends, and close
//! the event channel on every exit path.
mod concurrency;
mod outcome;
mod session;
mod source;
mod spawner;
mod throughput;

#[cfg(test)]
mod tests;

use std::time::Duration;

use tokio::time::Instant;

pub use concurrency::load_test_concurrency;
pub use outcome::{Outcome, capture};
pub use source::{ListSource, RequestSource};
pub use spawner::Spawner;
pub use throughput::load_test_throughput;

pub(crate) fn nanos_since(start: Instant) -> u64 {
    duration_nanos(start.elapsed())
}

pub(crate) fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
