//! Request executors: the pluggable part that performs the actual I/O.
mod basic;
mod http;


use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::RequestError;

pub use basic::{EchoExecutor, NoopExecutor, SleepyExecutor};
pub use http::{HttpExecutor, HttpResponse, StatusValidator};

/// Executes one request and returns its response.
///
/// Called concurrently from many request tasks. `started` is the instant the
/// engine began timing the call. Per-request timeouts are the executor's
/// responsibility.
#[async_trait]
pub trait RequestExecutor<T>: Send + Sync
where
    T: Send + 'static,
{
    type Response: Send + 'static;

    async fn execute(&self, started: Instant, request: T) -> Result<Self::Response, RequestError>;
}

/// Post-execution check turning a received response into an accepted one.
pub trait Validator<T>: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RequestError::Rejected`] (or another failure) when the value
    /// is not acceptable.
    fn validate(&self, value: &T) -> Result<(), RequestError>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), RequestError> + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), RequestError> {
        self(value)
    }
}
