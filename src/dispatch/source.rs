use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::DispatchResult;

/// Where a load test pulls its requests from.
///
/// `Ok(None)` ends the run cleanly. A closed channel is an end of stream, not
/// an error; `Err` is reserved for sources that genuinely fail.
#[async_trait]
pub trait RequestSource<T>: Send {
    async fn recv(&mut self) -> DispatchResult<Option<T>>;
}

#[async_trait]
impl<T> RequestSource<T> for mpsc::Receiver<T>
where
    T: Send,
{
    async fn recv(&mut self) -> DispatchResult<Option<T>> {
        Ok(mpsc::Receiver::recv(self).await)
    }
}

#[async_trait]
impl<T> RequestSource<T> for mpsc::UnboundedReceiver<T>
where
    T: Send,
{
    async fn recv(&mut self) -> DispatchResult<Option<T>> {
        Ok(mpsc::UnboundedReceiver::recv(self).await)
    }
}

/// Replays a list of requests, cycling through it until `total` have been
/// handed out.
#[derive(Debug, Clone)]
pub struct ListSource<T> {
    items: Vec<T>,
    total: usize,
    cursor: usize,
}

impl<T> ListSource<T> {
    /// Each item once.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self::cycled(items, total)
    }

    #[must_use]
    pub const fn cycled(items: Vec<T>, total: usize) -> Self {
        Self {
            items,
            total,
            cursor: 0,
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.cursor)
    }
}

#[async_trait]
impl<T> RequestSource<T> for ListSource<T>
where
    T: Clone + Send + Sync,
{
    async fn recv(&mut self) -> DispatchResult<Option<T>> {
        if self.cursor >= self.total {
            return Ok(None);
        }
        let item = self
            .cursor
            .checked_rem(self.items.len())
            .and_then(|idx| self.items.get(idx))
            .cloned();
        if item.is_some() {
            self.cursor = self.cursor.saturating_add(1);
        }
        Ok(item)
    }
}
