//! Concurrency primitives shared by the dispatch engine.
mod wait_group;

pub use wait_group::{WaitGroup, WaitGroupGuard};
