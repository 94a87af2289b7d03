use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

use crate::error::DispatchResult;
use crate::events::EventSender;
use crate::executors::RequestExecutor;
use crate::intervals::IntervalGenerator;

use super::session::{CloseOnDrop, Session};
use super::source::RequestSource;
use super::spawner::Spawner;
use super::{duration_nanos, nanos_since};

/// Dispatches requests at the pace set by `intervals`, with unbounded
/// concurrency.
///
/// Overage is how far the loop has fallen behind its intended schedule. A
/// positive overage only shortens the next sleeps, down to zero. A negative
/// overage (running early) lengthens the next sleep. A delay is never
/// negative. Each event carries the wait slept before its dispatch and the
/// overage left after that wait was adjusted, before this iteration's lag is
/// added.
///
/// The first `warmup` requests are executed but not reported. Returns once
/// the source is exhausted and every request has completed; the event channel
/// is closed on return, on error and on cancellation.
///
/// # Errors
///
/// Returns the source's error if it fails, or
/// [`DispatchError::EventChannelClosed`](crate::error::DispatchError) if any
/// timing event could not be delivered.
pub async fn load_test_throughput<T, S, E, G>(
    mut intervals: G,
    warmup: u64,
    mut requests: S,
    executor: Arc<E>,
    events: EventSender<E::Response>,
    spawner: Option<Spawner>,
) -> DispatchResult<()>
where
    T: Send + 'static,
    S: RequestSource<T>,
    E: RequestExecutor<T> + 'static,
    G: IntervalGenerator,
{
    let _close = CloseOnDrop::new(&events);
    let mut session = Session::new(executor, events, spawner, warmup);
    debug!("Starting throughput load test with warmup {}", warmup);

    let start = Instant::now();
    let mut overage_nanos: i64 = 0;
    let mut overage_start = Instant::now();

    loop {
        let receive_start = Instant::now();
        let Some(request) = requests.recv().await? else {
            break;
        };
        trace!("Received request in {:?}", receive_start.elapsed());

        let raw_nanos = intervals.next_interval(nanos_since(start));
        let adjust_nanos = raw_nanos.min(overage_nanos);
        let delay_nanos = raw_nanos.saturating_sub(adjust_nanos);
        overage_nanos = overage_nanos.saturating_sub(adjust_nanos);

        let wait_nanos = u64::try_from(delay_nanos).unwrap_or(0);
        if wait_nanos > 0 {
            let sleep_start = Instant::now();
            sleep(Duration::from_nanos(wait_nanos)).await;
            trace!(
                "Slept {:?} for a {}ns delay",
                sleep_start.elapsed(),
                wait_nanos
            );
        }

        let dispatch_start = Instant::now();
        session.dispatch(request, wait_nanos, overage_nanos, None);
        trace!("Dispatched request in {:?}", dispatch_start.elapsed());

        let now = Instant::now();
        let since_last = i64::try_from(duration_nanos(now.duration_since(overage_start)))
            .unwrap_or(i64::MAX);
        overage_nanos = overage_nanos
            .saturating_add(since_last)
            .saturating_sub(delay_nanos);
        overage_start = now;
    }

    session.drain().await
}
