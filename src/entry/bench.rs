use std::sync::Arc;

use tokio::time::Instant;
use tracing::{Level, info};

use pacebench::args::{ArrivalKind, BenchArgs, LoadMode, PositiveU64};
use pacebench::dispatch::{load_test_concurrency, load_test_throughput};
use pacebench::error::AppResult;
use pacebench::events::recorders::{HistogramRecorder, HistogramSummary, LoggingRecorder};
use pacebench::events::{EventCapacity, event_channel, spawn_recording};
use pacebench::executors::{HttpExecutor, StatusValidator};
use pacebench::intervals::{Arrival, ConstantInterval, ExponentialInterval};

use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

use super::requests::{build_request_template, spawn_request_generator};

/// Latencies are recorded in microseconds.
const HISTOGRAM_SCALE_NANOS: u64 = 1_000;

pub(super) async fn run_bench(args: BenchArgs) -> AppResult<()> {
    let url = args.target_url()?.to_owned();
    args.check_warmup()?;
    let mode = args.load_mode()?;

    let executor = HttpExecutor::with_timeouts(args.request_timeout, args.connect_timeout)?
        .validated_by(StatusValidator::new(args.expected_status));
    let template = build_request_template(executor.client(), &args, &url)?;
    let executor = Arc::new(executor);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let (requests, generator) =
        spawn_request_generator(template, args.requests.get(), shutdown_rx);

    let (events_tx, events_rx) = event_channel(EventCapacity::from_buffer(args.event_buffer));
    let histogram = HistogramRecorder::new(PositiveU64::try_from(HISTOGRAM_SCALE_NANOS)?)?;
    let event_level = if args.verbose { Level::INFO } else { Level::DEBUG };
    let recording = spawn_recording(events_rx, (histogram, LoggingRecorder::new(event_level)));

    info!(
        "Sending {} {:?} request(s) to {} ({} warmup), {}",
        args.requests.get(),
        args.method,
        url,
        args.warmup,
        describe_mode(&mode)
    );

    let started = Instant::now();
    let dispatched = match mode {
        LoadMode::Throughput {
            rate,
            arrival,
            seed,
        } => {
            load_test_throughput(
                arrival_for(rate, arrival, seed),
                args.warmup,
                requests,
                executor,
                events_tx,
                None,
            )
            .await
        }
        LoadMode::Concurrency(limit) => {
            load_test_concurrency(limit, args.warmup, requests, executor, events_tx, None).await
        }
    };
    let elapsed = started.elapsed();

    drop(shutdown_tx.send(()));
    generator.await?;
    signal_handle.await?;
    let (histogram, _) = recording.await?;
    dispatched?;

    print_summary(&histogram.summary(), elapsed);
    Ok(())
}

fn arrival_for(rate: PositiveU64, kind: ArrivalKind, seed: Option<u64>) -> Arrival {
    match (kind, seed) {
        (ArrivalKind::Constant, _) => Arrival::Constant(ConstantInterval::per_second(rate.get())),
        (ArrivalKind::Exponential, Some(seed)) => {
            Arrival::Exponential(ExponentialInterval::with_seed(rate, seed))
        }
        (ArrivalKind::Exponential, None) => Arrival::Exponential(ExponentialInterval::new(rate)),
    }
}

fn describe_mode(mode: &LoadMode) -> String {
    match mode {
        LoadMode::Throughput { rate, arrival, .. } => {
            format!("{:?} arrivals at {} req/s", arrival, rate.get())
        }
        LoadMode::Concurrency(limit) => format!("{} in flight", limit.get()),
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "Requests per second is reported as a float."
)]
fn print_summary(summary: &HistogramSummary, elapsed: std::time::Duration) {
    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        summary.count as f64 / secs
    } else {
        0.0
    };
    println!("Latency (us)");
    println!("{}", summary);
    println!("Throughput: {:.1} req/s over {:.3}s", throughput, secs);
}
