use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::RequestError;

use super::RequestExecutor;

/// Does nothing. Measures pure engine overhead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExecutor;

#[async_trait]
impl<T> RequestExecutor<T> for NoopExecutor
where
    T: Send + 'static,
{
    type Response = ();

    async fn execute(&self, _started: Instant, _request: T) -> Result<(), RequestError> {
        Ok(())
    }
}

/// Sleeps for a fixed duration per request.
#[derive(Debug, Clone, Copy)]
pub struct SleepyExecutor {
    delay: Duration,
}

impl SleepyExecutor {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl<T> RequestExecutor<T> for SleepyExecutor
where
    T: Send + 'static,
{
    type Response = ();

    async fn execute(&self, _started: Instant, _request: T) -> Result<(), RequestError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Returns the request unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoExecutor;

#[async_trait]
impl<T> RequestExecutor<T> for EchoExecutor
where
    T: Send + 'static,
{
    type Response = T;

    async fn execute(&self, _started: Instant, request: T) -> Result<T, RequestError> {
        Ok(request)
    }
}
