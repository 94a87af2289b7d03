use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::time::Instant;
use tracing::error;

use crate::error::RequestError;
use crate::events::TimingEvent;
use crate::executors::RequestExecutor;

use super::nanos_since;

/// Result of executing one request.
#[derive(Debug)]
pub struct Outcome<R> {
    execution_nanos: u64,
    result: Result<R, RequestError>,
}

impl<R> Outcome<R> {
    #[must_use]
    pub const fn execution_nanos(&self) -> u64 {
        self.execution_nanos
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn into_event(self, wait_nanos: u64, overage_nanos: i64) -> TimingEvent<R> {
        TimingEvent::new(wait_nanos, self.execution_nanos, overage_nanos, self.result)
    }
}

/// Runs one request through `executor`; `execution_nanos` is measured from
/// `started`.
///
/// Errors and panics raised by the executor are captured into the outcome;
/// nothing propagates to the caller.
pub async fn capture<T, E>(executor: &E, started: Instant, request: T) -> Outcome<E::Response>
where
    T: Send + 'static,
    E: RequestExecutor<T> + ?Sized,
{
    let result = AssertUnwindSafe(executor.execute(started, request))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(RequestError::from_panic(payload.as_ref())));
    let execution_nanos = nanos_since(started);

    if let Err(err) = &result {
        error!("Request failed: {}", err);
    }

    Outcome {
        execution_nanos,
        result,
    }
}
