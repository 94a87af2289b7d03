use super::*;
use crate::args::PositiveUsize;
use crate::error::{DispatchError, DispatchResult, RequestError};
use crate::events::{EventCapacity, EventReceiver, TimingEvent, event_channel};
use crate::executors::{EchoExecutor, NoopExecutor, RequestExecutor, SleepyExecutor};
use crate::intervals::ConstantInterval;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn run_paused_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

async fn collect<R>(mut events: EventReceiver<R>) -> Vec<TimingEvent<R>> {
    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    collected
}

fn requests(count: u32) -> ListSource<u32> {
    ListSource::new((0..count).collect())
}

fn permits(value: usize) -> Result<PositiveUsize, String> {
    PositiveUsize::try_from(value).map_err(|err| err.to_string())
}

/// Fails odd requests and panics on 4.
struct FlakyExecutor;

#[async_trait]
impl RequestExecutor<u32> for FlakyExecutor {
    type Response = u32;

    #[expect(clippy::panic, reason = "Exercises panic capture.")]
    async fn execute(&self, _started: Instant, request: u32) -> Result<u32, RequestError> {
        if request == 4 {
            panic!("request 4 blew up");
        }
        if request.checked_rem(2) == Some(1) {
            return Err(RequestError::failed(format!("odd request {}", request)));
        }
        Ok(request)
    }
}

/// Tracks how many requests run at once.
#[derive(Default)]
struct PeakExecutor {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl RequestExecutor<u32> for PeakExecutor {
    type Response = ();

    async fn execute(&self, _started: Instant, _request: u32) -> Result<(), RequestError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Yields `items` requests, each costing `cost` to receive, then fails if
/// `fail` is set.
struct PacedSource {
    items: u32,
    cost: Duration,
    fail: bool,
}

#[async_trait]
impl RequestSource<u32> for PacedSource {
    async fn recv(&mut self) -> DispatchResult<Option<u32>> {
        if self.items == 0 {
            if self.fail {
                return Err(DispatchError::request_source("source went away"));
            }
            return Ok(None);
        }
        if !self.cost.is_zero() {
            tokio::time::sleep(self.cost).await;
        }
        self.items = self.items.saturating_sub(1);
        Ok(Some(self.items))
    }
}

#[test]
fn warmup_requests_are_executed_but_not_reported() -> Result<(), String> {
    run_async_test(async {
        for (total, warmup) in [(0_u32, 0_u64), (5, 0), (5, 2), (5, 5), (3, 10)] {
            let expected = u64::from(total).saturating_sub(warmup);

            let (tx, rx) = event_channel(EventCapacity::Unbounded);
            load_test_throughput(
                ConstantInterval::new(0),
                warmup,
                requests(total),
                Arc::new(NoopExecutor),
                tx,
                None,
            )
            .await
            .map_err(|err| err.to_string())?;
            let throughput = collect(rx).await.len();

            let (limited_tx, limited_rx) = event_channel(EventCapacity::Unbounded);
            load_test_concurrency(
                permits(2)?,
                warmup,
                requests(total),
                Arc::new(NoopExecutor),
                limited_tx,
                None,
            )
            .await
            .map_err(|err| err.to_string())?;
            let concurrency = collect(limited_rx).await.len();

            for (mode, seen) in [("throughput", throughput), ("concurrency", concurrency)] {
                if u64::try_from(seen).map_err(|err| err.to_string())? != expected {
                    return Err(format!(
                        "{} mode: {} requests with warmup {} gave {} events, expected {}",
                        mode, total, warmup, seen, expected
                    ));
                }
            }
        }
        Ok(())
    })
}

#[test]
fn zero_interval_preserves_request_order() -> Result<(), String> {
    run_async_test(async {
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_throughput(
            ConstantInterval::new(0),
            0,
            ListSource::new(vec!["a", "b", "c"]),
            Arc::new(EchoExecutor),
            tx,
            None,
        )
        .await
        .map_err(|err| err.to_string())?;

        let events = collect(rx).await;
        let echoed: Vec<&str> = events.iter().filter_map(|event| event.response().copied()).collect();
        if echoed != ["a", "b", "c"] {
            return Err(format!("Unexpected order: {:?}", echoed));
        }
        if events.iter().any(|event| event.wait_nanos() != 0) {
            return Err("Zero interval should record zero wait".to_owned());
        }
        Ok(())
    })
}

#[test]
fn failures_and_panics_become_failed_events() -> Result<(), String> {
    run_async_test(async {
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_concurrency(permits(1)?, 0, requests(6), Arc::new(FlakyExecutor), tx, None)
            .await
            .map_err(|err| err.to_string())?;

        let events = collect(rx).await;
        if events.len() != 6 {
            return Err(format!("Expected 6 events, got {}", events.len()));
        }
        let successes: Vec<u32> = events
            .iter()
            .filter_map(|event| event.response().copied())
            .collect();
        if successes != [0, 2] {
            return Err(format!("Unexpected successes: {:?}", successes));
        }
        let panicked = events
            .iter()
            .filter(|event| matches!(event.failure(), Some(RequestError::Panicked { .. })))
            .count();
        if panicked != 1 {
            return Err(format!("Expected one panicked event, got {}", panicked));
        }
        if events
            .iter()
            .any(|event| event.wait_nanos() != 0 || event.overage_nanos() != 0)
        {
            return Err("Concurrency mode events must carry zero wait and overage".to_owned());
        }
        Ok(())
    })
}

#[test]
fn concurrency_limit_is_never_exceeded() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(PeakExecutor::default());
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_concurrency(permits(3)?, 0, requests(12), Arc::clone(&executor), tx, None)
            .await
            .map_err(|err| err.to_string())?;

        let seen = collect(rx).await.len();
        let peak = executor.peak.load(Ordering::SeqCst);
        if seen != 12 || peak == 0 || peak > 3 {
            return Err(format!("Expected 12 events at peak <= 3, got {} at {}", seen, peak));
        }
        if executor.in_flight.load(Ordering::SeqCst) != 0 {
            return Err("Requests still in flight after return".to_owned());
        }
        Ok(())
    })
}

#[test]
fn throughput_mode_does_not_bound_concurrency() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(PeakExecutor::default());
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_throughput(
            ConstantInterval::new(0),
            0,
            requests(10),
            Arc::clone(&executor),
            tx,
            None,
        )
        .await
        .map_err(|err| err.to_string())?;

        let seen = collect(rx).await.len();
        let peak = executor.peak.load(Ordering::SeqCst);
        if seen != 10 || peak != 10 {
            return Err(format!("Expected 10 events at peak 10, got {} at {}", seen, peak));
        }
        Ok(())
    })
}

#[test]
fn overage_keeps_long_run_rate_on_target() -> Result<(), String> {
    run_paused_test(async {
        let interval = Duration::from_millis(3);
        let source = PacedSource {
            items: 200,
            cost: Duration::from_millis(1),
            fail: false,
        };
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        let started = Instant::now();
        load_test_throughput(
            ConstantInterval::from_duration(interval),
            0,
            source,
            Arc::new(NoopExecutor),
            tx,
            None,
        )
        .await
        .map_err(|err| err.to_string())?;
        let elapsed = started.elapsed();

        let events = collect(rx).await;
        if events.len() != 200 {
            return Err(format!("Expected 200 events, got {}", events.len()));
        }
        // 200 x 3ms on schedule; without overage the 1ms receive cost adds 200ms.
        if elapsed < Duration::from_millis(590) || elapsed > Duration::from_millis(640) {
            return Err(format!("Run took {:?}, expected about 600ms", elapsed));
        }
        let total_wait: u64 = events.iter().map(TimingEvent::wait_nanos).sum();
        if total_wait > 440_000_000 {
            return Err(format!("Sleeps were not shortened: {}ns total wait", total_wait));
        }
        if events.iter().any(|event| event.overage_nanos() < 0) {
            return Err("Overage should never go negative here".to_owned());
        }
        Ok(())
    })
}

#[test]
fn events_report_overage_before_the_iteration_lag_is_added() -> Result<(), String> {
    run_paused_test(async {
        let source = PacedSource {
            items: 5,
            cost: Duration::from_millis(3),
            fail: false,
        };
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_throughput(
            ConstantInterval::from_duration(Duration::from_millis(1)),
            0,
            source,
            Arc::new(NoopExecutor),
            tx,
            None,
        )
        .await
        .map_err(|err| err.to_string())?;

        let mut pairs: Vec<(u64, i64)> = collect(rx)
            .await
            .iter()
            .map(|event| (event.wait_nanos(), event.overage_nanos()))
            .collect();
        pairs.sort_unstable();
        // The first request sleeps its full 1ms. Each later 3ms receive is
        // paid back by only 1ms of interval, so overage grows by 2ms.
        let expected = vec![
            (0, 2_000_000),
            (0, 4_000_000),
            (0, 6_000_000),
            (0, 8_000_000),
            (1_000_000, 0),
        ];
        if pairs != expected {
            return Err(format!("Expected {:?}, got {:?}", expected, pairs));
        }
        Ok(())
    })
}

#[test]
fn source_error_closes_channel_and_propagates() -> Result<(), String> {
    run_async_test(async {
        let source = PacedSource {
            items: 2,
            cost: Duration::ZERO,
            fail: true,
        };
        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        let result = load_test_throughput(
            ConstantInterval::new(0),
            0,
            source,
            Arc::new(NoopExecutor),
            tx,
            None,
        )
        .await;
        if !matches!(result, Err(DispatchError::RequestSource { .. })) {
            return Err(format!("Expected a source error, got {:?}", result));
        }

        let drained = tokio::time::timeout(Duration::from_secs(1), collect(rx)).await;
        if drained.is_err() {
            return Err("Event channel was not closed after a source error".to_owned());
        }
        Ok(())
    })
}

#[test]
fn cancellation_closes_event_channel() -> Result<(), String> {
    run_async_test(async {
        let (request_tx, request_rx) = mpsc::channel::<u32>(8);
        for value in 0..3 {
            request_tx
                .send(value)
                .await
                .map_err(|err| err.to_string())?;
        }

        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        let run = load_test_throughput(
            ConstantInterval::new(0),
            0,
            request_rx,
            Arc::new(EchoExecutor),
            tx,
            None,
        );
        if tokio::time::timeout(Duration::from_millis(20), run).await.is_ok() {
            return Err("Run should still be waiting on the open request channel".to_owned());
        }

        let events = tokio::time::timeout(Duration::from_secs(1), collect(rx))
            .await
            .map_err(|_elapsed| "Event channel was not closed on cancellation".to_owned())?;
        if events.len() != 3 {
            return Err(format!("Expected 3 events before cancel, got {}", events.len()));
        }
        drop(request_tx);
        Ok(())
    })
}

#[test]
fn lost_events_fail_the_run_after_draining() -> Result<(), String> {
    run_async_test(async {
        let (tx, rx) = event_channel::<()>(EventCapacity::Unbounded);
        drop(rx);
        let result = load_test_concurrency(
            permits(2)?,
            0,
            requests(3),
            Arc::new(NoopExecutor),
            tx,
            None,
        )
        .await;
        if !matches!(result, Err(DispatchError::EventChannelClosed)) {
            return Err(format!("Expected EventChannelClosed, got {:?}", result));
        }

        let (warmup_tx, warmup_rx) = event_channel::<()>(EventCapacity::Unbounded);
        drop(warmup_rx);
        load_test_concurrency(permits(2)?, 3, requests(3), Arc::new(NoopExecutor), warmup_tx, None)
            .await
            .map_err(|err| format!("Warmup-only run should not send: {}", err))
    })
}

#[test]
fn custom_spawner_runs_every_request() -> Result<(), String> {
    run_async_test(async {
        let spawned = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&spawned);
        let spawner = Spawner::new(move |task| {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(tokio::spawn(task));
        });

        let (tx, rx) = event_channel(EventCapacity::Unbounded);
        load_test_throughput(
            ConstantInterval::new(0),
            1,
            requests(5),
            Arc::new(NoopExecutor),
            tx,
            Some(spawner),
        )
        .await
        .map_err(|err| err.to_string())?;

        let seen = collect(rx).await.len();
        if spawned.load(Ordering::SeqCst) != 5 || seen != 4 {
            return Err(format!(
                "Expected 5 spawns and 4 events, got {} and {}",
                spawned.load(Ordering::SeqCst),
                seen
            ));
        }

        let (handle_tx, handle_rx) = event_channel(EventCapacity::Unbounded);
        load_test_concurrency(
            permits(2)?,
            0,
            requests(3),
            Arc::new(SleepyExecutor::new(Duration::from_millis(1))),
            handle_tx,
            Some(Spawner::on(tokio::runtime::Handle::current())),
        )
        .await
        .map_err(|err| err.to_string())?;
        if collect(handle_rx).await.len() != 3 {
            return Err("Handle spawner lost events".to_owned());
        }
        Ok(())
    })
}

#[test]
fn capture_times_only_the_executor_call() -> Result<(), String> {
    run_async_test(async {
        let outcome = capture(
            &SleepyExecutor::new(Duration::from_millis(10)),
            Instant::now(),
            (),
        )
        .await;
        if !outcome.is_success() || outcome.execution_nanos() < 10_000_000 {
            return Err(format!(
                "Unexpected outcome: success={} nanos={}",
                outcome.is_success(),
                outcome.execution_nanos()
            ));
        }

        let event = capture(&FlakyExecutor, Instant::now(), 4).await.into_event(7, -2);
        if event.wait_nanos() != 7 || event.overage_nanos() != -2 {
            return Err("Event did not keep wait and overage".to_owned());
        }
        match event.failure() {
            Some(RequestError::Panicked { message }) if message.contains("blew up") => Ok(()),
            other => Err(format!("Expected a panic failure, got {:?}", other)),
        }
    })
}

#[test]
fn list_source_cycles_up_to_total() -> Result<(), String> {
    run_async_test(async {
        let mut source = ListSource::cycled(vec![1_u8, 2], 5);
        let mut seen = Vec::new();
        while let Some(item) = RequestSource::recv(&mut source)
            .await
            .map_err(|err| err.to_string())?
        {
            seen.push(item);
        }
        if seen != [1, 2, 1, 2, 1] || source.remaining() != 0 {
            return Err(format!("Unexpected cycle: {:?}", seen));
        }

        let mut empty = ListSource::<u8>::cycled(Vec::new(), 3);
        match RequestSource::recv(&mut empty).await {
            Ok(None) => Ok(()),
            other => Err(format!("Empty list should end immediately, got {:?}", other)),
        }
    })
}
