use clap::Parser;
use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{ArrivalKind, HttpMethod, LoadMode, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Paced HTTP load generator: hold a target request rate or a fixed number of requests in flight, and report per-request latency."
)]
pub struct BenchArgs {
    /// Target URL for the load test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', value_enum, default_value_t = HttpMethod::Get)]
    pub method: HttpMethod,

    /// Request body
    #[arg(long, short = 'd', default_value = "")]
    pub data: String,

    /// Total number of requests to send, warmup included
    #[arg(long = "requests", short = 'n', default_value = "100", value_parser = parse_positive_u64)]
    pub requests: PositiveU64,

    /// Number of leading requests that are sent but not reported
    #[arg(long, short = 'w', default_value_t = 0)]
    pub warmup: u64,

    /// Target requests per second (throughput mode)
    #[arg(long, short = 'r', value_parser = parse_positive_u64, conflicts_with = "concurrency")]
    pub rate: Option<PositiveU64>,

    /// Maximum requests in flight (concurrency mode, the default with 1)
    #[arg(long, short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Arrival process used with --rate
    #[arg(long, value_enum, default_value_t = ArrivalKind::Constant)]
    pub arrival: ArrivalKind,

    /// Seed for exponential arrivals (random when unset)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", short = 't', default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// TCP connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", default_value = "5s", value_parser = parse_duration_arg)]
    pub connect_timeout: Duration,

    /// Status code a response must carry to count as a success
    #[arg(long = "status", short = 's', default_value_t = 200)]
    pub expected_status: u16,

    /// Timing event buffer size, 0 for unbounded
    #[arg(long = "event-buffer", default_value_t = 1024)]
    pub event_buffer: usize,

    /// Log every timing event and enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Path to a TOML or JSON config file (defaults to ./pacebench.toml or ./pacebench.json)
    #[arg(long)]
    pub config: Option<String>,
}

impl BenchArgs {
    /// Resolves the dispatch mode. Without --rate or --concurrency requests
    /// run one at a time.
    ///
    /// # Errors
    ///
    /// Returns an error when both a rate and a concurrency limit are set.
    pub fn load_mode(&self) -> AppResult<LoadMode> {
        match (self.rate, self.concurrency) {
            (Some(_), Some(_)) => Err(AppError::validation(ValidationError::RateAndConcurrency)),
            (Some(rate), None) => Ok(LoadMode::Throughput {
                rate,
                arrival: self.arrival,
                seed: self.seed,
            }),
            (None, Some(limit)) => Ok(LoadMode::Concurrency(limit)),
            (None, None) => Ok(LoadMode::Concurrency(PositiveUsize::try_from(1)?)),
        }
    }

    /// Returns the target URL.
    ///
    /// # Errors
    ///
    /// Returns an error when no URL was given on the CLI or in the config.
    pub fn target_url(&self) -> AppResult<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))
    }

    /// Rejects a warmup longer than the run. A warmup equal to the request
    /// count is allowed and reports nothing.
    ///
    /// # Errors
    ///
    /// Returns an error when the warmup exceeds the request count.
    pub fn check_warmup(&self) -> AppResult<()> {
        if self.warmup > self.requests.get() {
            return Err(AppError::validation(
                ValidationError::WarmupExceedsRequests {
                    warmup: self.warmup,
                    requests: self.requests.get(),
                },
            ));
        }
        Ok(())
    }
}
