use crate::error::RequestError;

/// Timing data and result for one measured request.
///
/// `wait_nanos` is the pacing sleep that preceded the dispatch,
/// `duration_nanos` the executor call alone, and `overage_nanos` the dispatch
/// loop's outstanding overhead credit when the request was sent. Concurrency
/// mode reports zero for both pacing fields.
#[derive(Debug)]
pub struct TimingEvent<R> {
    wait_nanos: u64,
    duration_nanos: u64,
    overage_nanos: i64,
    result: Result<R, RequestError>,
}

impl<R> TimingEvent<R> {
    #[must_use]
    pub const fn new(
        wait_nanos: u64,
        duration_nanos: u64,
        overage_nanos: i64,
        result: Result<R, RequestError>,
    ) -> Self {
        Self {
            wait_nanos,
            duration_nanos,
            overage_nanos,
            result,
        }
    }

    #[must_use]
    pub const fn wait_nanos(&self) -> u64 {
        self.wait_nanos
    }

    #[must_use]
    pub const fn duration_nanos(&self) -> u64 {
        self.duration_nanos
    }

    #[must_use]
    pub const fn overage_nanos(&self) -> i64 {
        self.overage_nanos
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    #[must_use]
    pub fn response(&self) -> Option<&R> {
        self.result.as_ref().ok()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&RequestError> {
        self.result.as_ref().err()
    }

    #[must_use]
    pub const fn result(&self) -> &Result<R, RequestError> {
        &self.result
    }

    /// # Errors
    ///
    /// Returns the captured request failure for unsuccessful events.
    pub fn into_result(self) -> Result<R, RequestError> {
        self.result
    }
}
