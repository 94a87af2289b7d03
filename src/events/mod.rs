//! Timing events and the pipeline that carries them to recorders.
//!
//! Request tasks push one [`TimingEvent`] per measured request into an
//! [`EventSender`]. A recording task drains the matching [`EventReceiver`]
//! and hands every event to a chain of [`Recorder`]s, strictly one event at a
//! time and in registration order. The dispatch engine closes the channel once
//! the run has drained; the recording task ends when it sees that closure.
mod channel;
pub mod recorders;
mod recording;
mod timing;


pub use channel::{EventCapacity, EventReceiver, EventSender, event_channel};
pub use recording::{Recorder, record_events, spawn_recording};
pub use timing::TimingEvent;
