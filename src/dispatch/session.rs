use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OwnedSemaphorePermit;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::{DispatchError, DispatchResult};
use crate::events::EventSender;
use crate::executors::RequestExecutor;
use crate::sync::WaitGroup;

use super::outcome::capture;
use super::spawner::Spawner;

/// Closes the event channel when the dispatch loop exits, however it exits.
pub(super) struct CloseOnDrop<R> {
    events: EventSender<R>,
}

impl<R> CloseOnDrop<R> {
    pub(super) fn new(events: &EventSender<R>) -> Self {
        Self {
            events: events.clone(),
        }
    }
}

impl<R> Drop for CloseOnDrop<R> {
    fn drop(&mut self) {
        self.events.close();
    }
}

/// Per-run dispatch state shared by both load test modes.
pub(super) struct Session<T, E>
where
    T: Send + 'static,
    E: RequestExecutor<T> + 'static,
{
    executor: Arc<E>,
    events: EventSender<E::Response>,
    spawner: Spawner,
    in_flight: WaitGroup,
    send_failed: Arc<AtomicBool>,
    warmup_remaining: u64,
    dispatched: u64,
    _request: std::marker::PhantomData<fn(T)>,
}

impl<T, E> Session<T, E>
where
    T: Send + 'static,
    E: RequestExecutor<T> + 'static,
{
    pub(super) fn new(
        executor: Arc<E>,
        events: EventSender<E::Response>,
        spawner: Option<Spawner>,
        warmup: u64,
    ) -> Self {
        Self {
            executor,
            events,
            spawner: spawner.unwrap_or_default(),
            in_flight: WaitGroup::new(),
            send_failed: Arc::new(AtomicBool::new(false)),
            warmup_remaining: warmup,
            dispatched: 0,
            _request: std::marker::PhantomData,
        }
    }

    /// Spawns one request task. Warmup requests run but are not reported.
    pub(super) fn dispatch(
        &mut self,
        request: T,
        wait_nanos: u64,
        overage_nanos: i64,
        permit: Option<OwnedSemaphorePermit>,
    ) {
        let report = self.warmup_remaining == 0;
        let guard = self.in_flight.guard();
        let executor = Arc::clone(&self.executor);
        let events = self.events.clone();
        let send_failed = Arc::clone(&self.send_failed);

        self.spawner.spawn(Box::pin(async move {
            let outcome = capture(executor.as_ref(), Instant::now(), request).await;
            if report {
                let event = outcome.into_event(wait_nanos, overage_nanos);
                if let Err(err) = events.send(event).await {
                    error!("Failed to deliver timing event: {}", err);
                    send_failed.store(true, Ordering::Release);
                }
            }
            drop(permit);
            drop(guard);
        }));

        self.warmup_remaining = self.warmup_remaining.saturating_sub(1);
        self.dispatched = self.dispatched.saturating_add(1);
    }

    /// Waits for every in-flight request, then reports any lost events.
    pub(super) async fn drain(self) -> DispatchResult<()> {
        debug!(
            "Draining {} in-flight request(s) after {} dispatched",
            self.in_flight.count(),
            self.dispatched
        );
        self.in_flight.wait().await;
        if self.send_failed.load(Ordering::Acquire) {
            return Err(DispatchError::EventChannelClosed);
        }
        Ok(())
    }
}
