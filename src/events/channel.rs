use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::args::PositiveUsize;
use crate::error::{DispatchError, DispatchResult};

use super::TimingEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCapacity {
    /// Sends wait for space: slow recorders push back on request tasks.
    Bounded(PositiveUsize),
    Unbounded,
}

impl EventCapacity {
    /// `0` means unbounded.
    #[must_use]
    pub fn from_buffer(buffer: usize) -> Self {
        PositiveUsize::try_from(buffer).map_or(EventCapacity::Unbounded, EventCapacity::Bounded)
    }
}

enum EventTx<R> {
    Bounded(mpsc::Sender<TimingEvent<R>>),
    Unbounded(mpsc::UnboundedSender<TimingEvent<R>>),
}

enum EventRx<R> {
    Bounded(mpsc::Receiver<TimingEvent<R>>),
    Unbounded(mpsc::UnboundedReceiver<TimingEvent<R>>),
}

impl<R> EventRx<R> {
    async fn recv(&mut self) -> Option<TimingEvent<R>> {
        match self {
            EventRx::Bounded(rx) => rx.recv().await,
            EventRx::Unbounded(rx) => rx.recv().await,
        }
    }

    fn try_recv(&mut self) -> Option<TimingEvent<R>> {
        match self {
            EventRx::Bounded(rx) => rx.try_recv().ok(),
            EventRx::Unbounded(rx) => rx.try_recv().ok(),
        }
    }
}

/// Multi-producer handle for timing events. Cloned into every request task.
pub struct EventSender<R> {
    tx: EventTx<R>,
    closed: Arc<watch::Sender<bool>>,
}

/// Consumer side of the event channel.
pub struct EventReceiver<R> {
    rx: EventRx<R>,
    closed: watch::Receiver<bool>,
}

#[must_use]
pub fn event_channel<R>(capacity: EventCapacity) -> (EventSender<R>, EventReceiver<R>) {
    let (closed_tx, closed_rx) = watch::channel(false);
    let (tx, rx) = match capacity {
        EventCapacity::Bounded(size) => {
            let (tx, rx) = mpsc::channel(size.get());
            (EventTx::Bounded(tx), EventRx::Bounded(rx))
        }
        EventCapacity::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (EventTx::Unbounded(tx), EventRx::Unbounded(rx))
        }
    };
    (
        EventSender {
            tx,
            closed: Arc::new(closed_tx),
        },
        EventReceiver {
            rx,
            closed: closed_rx,
        },
    )
}

impl<R> Clone for EventSender<R> {
    fn clone(&self) -> Self {
        let tx = match &self.tx {
            EventTx::Bounded(tx) => EventTx::Bounded(tx.clone()),
            EventTx::Unbounded(tx) => EventTx::Unbounded(tx.clone()),
        };
        Self {
            tx,
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<R> std::fmt::Debug for EventSender<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSender")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl<R> EventSender<R> {
    /// Queues one event, waiting for space on a bounded channel.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::EventChannelClosed`] once the channel has been
    /// closed or the receiver is gone.
    pub async fn send(&self, event: TimingEvent<R>) -> DispatchResult<()> {
        if self.is_closed() {
            return Err(DispatchError::EventChannelClosed);
        }
        match &self.tx {
            EventTx::Bounded(tx) => tx
                .send(event)
                .await
                .map_err(|_rejected| DispatchError::EventChannelClosed),
            EventTx::Unbounded(tx) => tx
                .send(event)
                .map_err(|_rejected| DispatchError::EventChannelClosed),
        }
    }

    /// Marks the end of the stream. Buffered events are still delivered.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl<R> EventReceiver<R> {
    /// Next event, or `None` once the channel is closed and drained.
    pub async fn recv(&mut self) -> Option<TimingEvent<R>> {
        if *self.closed.borrow() {
            return self.rx.try_recv();
        }
        let received = tokio::select! {
            biased;
            event = self.rx.recv() => Some(event),
            _closed = self.closed.wait_for(|closed| *closed) => None,
        };
        match received {
            Some(event) => event,
            None => self.rx.try_recv(),
        }
    }
}

impl<R> std::fmt::Debug for EventReceiver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReceiver")
            .field("closed", &*self.closed.borrow())
            .finish_non_exhaustive()
    }
}
