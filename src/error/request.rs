use std::time::Duration;

use thiserror::Error;

/// Failure of a single request execution.
///
/// These never stop a load test: the dispatch engine captures them into the
/// request's outcome and reports them as a failed `TimingEvent`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request failed: {message}")]
    Failed { message: String },
    #[error("Response rejected: {reason}")]
    Rejected { reason: String },
    #[error("Request panicked: {message}")]
    Panicked { message: String },
    #[error("Request timed out after {after:?}")]
    TimedOut { after: Duration },
    #[error("HTTP request failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    pub fn failed<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        RequestError::Failed {
            message: message.into(),
        }
    }

    pub fn rejected<M>(reason: M) -> Self
    where
        M: Into<String>,
    {
        RequestError::Rejected {
            reason: reason.into(),
        }
    }

    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        RequestError::Panicked { message }
    }
}
