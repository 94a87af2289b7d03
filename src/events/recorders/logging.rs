use std::fmt::Debug;

use tracing::Level;

use crate::events::{Recorder, TimingEvent};

/// Logs every event through `tracing` at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct LoggingRecorder {
    level: Level,
}

impl LoggingRecorder {
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingRecorder {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

macro_rules! log_event {
    ($level:expr, $event:expr) => {
        tracing::event!(
            $level,
            wait_nanos = $event.wait_nanos(),
            duration_nanos = $event.duration_nanos(),
            overage_nanos = $event.overage_nanos(),
            success = $event.is_success(),
            "{:?}",
            $event.result()
        )
    };
}

impl<R> Recorder<R> for LoggingRecorder
where
    R: Debug,
{
    fn record(&mut self, event: &TimingEvent<R>) {
        match self.level {
            Level::ERROR => log_event!(Level::ERROR, event),
            Level::WARN => log_event!(Level::WARN, event),
            Level::INFO => log_event!(Level::INFO, event),
            Level::DEBUG => log_event!(Level::DEBUG, event),
            _ => log_event!(Level::TRACE, event),
        }
    }
}
