use thiserror::Error;

/// Loop-level failure of a load test run. Fatal to the whole run.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Event channel closed before all timing events were delivered.")]
    EventChannelClosed,
    #[error("Concurrency limiter closed while requests were pending.")]
    ConcurrencyLimiterClosed,
    #[error("Request source failed: {source}")]
    RequestSource {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn request_source<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DispatchError::RequestSource {
            source: error.into(),
        }
    }
}
