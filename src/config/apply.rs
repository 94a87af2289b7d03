use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{BenchArgs, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. A value is taken from the
/// config only when the matching flag was not given on the command line.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each
/// other.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.rate.is_some() && config.concurrency.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "rate",
            right: "concurrency",
        }));
    }

    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = data;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = ensure_positive_u64(requests, "requests")?;
    }

    if !is_cli(matches, "warmup")
        && let Some(warmup) = config.warmup
    {
        args.warmup = warmup;
    }

    apply_load_mode(args, matches, config)?;

    if !is_cli(matches, "arrival")
        && let Some(arrival) = config.arrival
    {
        args.arrival = arrival;
    }

    if !is_cli(matches, "seed")
        && let Some(seed) = config.seed
    {
        args.seed = Some(seed);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(timeout, "connect_timeout")?;
    }

    if !is_cli(matches, "expected_status")
        && let Some(status) = config.status
    {
        args.expected_status = status;
    }

    if !is_cli(matches, "event_buffer")
        && let Some(buffer) = config.event_buffer
    {
        args.event_buffer = buffer;
    }

    if !is_cli(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

/// A mode picked on the command line suppresses the other mode from the
/// config.
fn apply_load_mode(args: &mut BenchArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    let cli_rate = is_cli(matches, "rate");
    let cli_concurrency = is_cli(matches, "concurrency");

    if !cli_rate
        && !cli_concurrency
        && let Some(rate) = config.rate
    {
        args.rate = Some(ensure_positive_u64(rate, "rate")?);
    }

    if !cli_rate
        && !cli_concurrency
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = Some(ensure_positive_usize(concurrency, "concurrency")?);
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn ensure_positive_usize(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}
