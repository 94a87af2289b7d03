use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::args::PositiveUsize;
use crate::error::{DispatchError, DispatchResult};
use crate::events::EventSender;
use crate::executors::RequestExecutor;

use super::session::{CloseOnDrop, Session};
use super::source::RequestSource;
use super::spawner::Spawner;

/// Dispatches requests as fast as possible with at most `concurrency` in
/// flight.
///
/// Events carry zero wait and zero overage. Warmup, draining and channel
/// close behave as in [`load_test_throughput`](super::load_test_throughput).
///
/// # Errors
///
/// Returns the source's error if it fails, or
/// [`DispatchError::EventChannelClosed`] if any timing event could not be
/// delivered.
pub async fn load_test_concurrency<T, S, E>(
    concurrency: PositiveUsize,
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
{
    let _close = CloseOnDrop::new(&events);
    let mut session = Session::new(executor, events, spawner, warmup);
    let permits = Arc::new(Semaphore::new(concurrency.get()));
    debug!(
        "Starting concurrency load test with {} permits and warmup {}",
        concurrency.get(),
        warmup
    );

    loop {
        let receive_start = Instant::now();
        let Some(request) = requests.recv().await? else {
            break;
        };
        trace!("Received request in {:?}", receive_start.elapsed());

        let acquire_start = Instant::now();
        let permit = Arc::clone(&permits)
            .acquire_owned()
            .await
            .map_err(|_closed| DispatchError::ConcurrencyLimiterClosed)?;
        trace!("Acquired permit in {:?}", acquire_start.elapsed());

        session.dispatch(request, 0, 0, Some(permit));
    }

    session.drain().await
}
