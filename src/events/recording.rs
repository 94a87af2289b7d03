use tokio::task::JoinHandle;
use tracing::debug;

use super::{EventReceiver, TimingEvent};

/// Consumer of timing events.
///
/// Recorders run on the recording task, one event at a time. A recorder that
/// blocks stalls every recorder after it and, with a bounded channel, the
/// request tasks behind them.
pub trait Recorder<R> {
    fn record(&mut self, event: &TimingEvent<R>);
}

impl<R> Recorder<R> for Vec<Box<dyn Recorder<R> + Send>> {
    fn record(&mut self, event: &TimingEvent<R>) {
        for recorder in self.iter_mut() {
            recorder.record(event);
        }
    }
}

impl<R, T> Recorder<R> for &mut T
where
    T: Recorder<R> + ?Sized,
{
    fn record(&mut self, event: &TimingEvent<R>) {
        (**self).record(event);
    }
}

macro_rules! chain_recorders {
    ($($name:ident => $idx:tt),+) => {
        impl<R, $($name),+> Recorder<R> for ($($name,)+)
        where
            $($name: Recorder<R>,)+
        {
            fn record(&mut self, event: &TimingEvent<R>) {
                $(self.$idx.record(event);)+
            }
        }
    };
}

chain_recorders!(A => 0);
chain_recorders!(A => 0, B => 1);
chain_recorders!(A => 0, B => 1, C => 2);
chain_recorders!(A => 0, B => 1, C => 2, D => 3);

/// Feeds every event to `recorders` until the channel is closed and drained.
/// Returns the number of events recorded.
pub async fn record_events<R, C>(mut events: EventReceiver<R>, recorders: &mut C) -> u64
where
    C: Recorder<R> + ?Sized,
{
    let mut recorded: u64 = 0;
    while let Some(event) = events.recv().await {
        recorders.record(&event);
        recorded = recorded.saturating_add(1);
    }
    debug!("Event stream closed after {} events", recorded);
    recorded
}

/// Spawns the recording task. The handle yields the recorders back once the
/// event stream ends, so their state can be read.
#[must_use]
pub fn spawn_recording<R, C>(events: EventReceiver<R>, mut recorders: C) -> JoinHandle<C>
where
    R: Send + 'static,
    C: Recorder<R> + Send + 'static,
{
    tokio::spawn(async move {
        record_events(events, &mut recorders).await;
        recorders
    })
}
