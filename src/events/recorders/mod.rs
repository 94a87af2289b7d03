//! Reference recorders.
mod counting;
mod histogram;
mod logging;

pub use counting::CountingRecorder;
pub use histogram::{HistogramRecorder, HistogramSummary};
pub use logging::LoggingRecorder;
