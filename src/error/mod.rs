mod app;
mod config;
mod dispatch;
mod http;
mod metrics;
mod request;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dispatch::{DispatchError, DispatchResult};
pub use http::HttpError;
pub use metrics::MetricsError;
pub use request::RequestError;
pub use validation::ValidationError;
