//! Paced load generation.
//!
//! The library drives requests against a target in one of two modes and
//! streams one [`TimingEvent`](events::TimingEvent) per measured request:
//!
//! - throughput mode ([`dispatch::load_test_throughput`]) spaces dispatches
//!   with an [`IntervalGenerator`](intervals::IntervalGenerator) and corrects
//!   for time the loop itself loses;
//! - concurrency mode ([`dispatch::load_test_concurrency`]) keeps a fixed
//!   number of requests in flight.
//!
//! What a request is and how it executes is up to the
//! [`RequestExecutor`](executors::RequestExecutor); what happens to the
//! events is up to the [`Recorder`](events::Recorder)s on the receiving side.
//! The `pacebench` binary wires both up for HTTP.
pub mod args;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod executors;
pub mod intervals;
pub mod sync;
