use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Request};
use tokio::time::Instant;

use crate::error::{HttpError, RequestError};

use super::{RequestExecutor, Validator};

/// Status and drained body size of an HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body_bytes: u64,
}

/// Executes `reqwest` requests on a shared, pooled client.
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    validator: Option<Arc<dyn Validator<HttpResponse>>>,
}

impl HttpExecutor {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
            validator: None,
        }
    }

    /// Client with the given per-request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_timeouts(
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self::new(client))
    }

    #[must_use]
    pub fn validated_by<V>(mut self, validator: V) -> Self
    where
        V: Validator<HttpResponse> + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("validated", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestExecutor<Request> for HttpExecutor {
    type Response = HttpResponse;

    async fn execute(&self, started: Instant, request: Request) -> Result<HttpResponse, RequestError> {
        let transport_error = |err: reqwest::Error| {
            if err.is_timeout() {
                RequestError::TimedOut {
                    after: started.elapsed(),
                }
            } else {
                RequestError::Http { source: err }
            }
        };

        let response = self
            .client
            .execute(request)
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body_bytes = drain_response_body(response)
            .await
            .map_err(transport_error)?;

        let response = HttpResponse { status, body_bytes };
        if let Some(validator) = self.validator.as_ref() {
            validator.validate(&response)?;
        }
        Ok(response)
    }
}

/// Rejects responses whose status differs from the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusValidator {
    expected: u16,
}

impl StatusValidator {
    #[must_use]
    pub const fn new(expected: u16) -> Self {
        Self { expected }
    }
}

impl Validator<HttpResponse> for StatusValidator {
    fn validate(&self, value: &HttpResponse) -> Result<(), RequestError> {
        if value.status == self.expected {
            Ok(())
        } else {
            Err(RequestError::rejected(format!(
                "status {} (expected {})",
                value.status, self.expected
            )))
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
