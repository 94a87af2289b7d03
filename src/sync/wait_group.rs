use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;
use tracing::error;

/// Counts outstanding request tasks and lets a single owner wait for zero.
///
/// `add` and `done` may be called from any number of tasks. Only one task may
/// `wait` at a time; the dispatch loop is that owner. A `done` that reaches
/// zero before the owner starts waiting leaves a stored wake-up behind, so the
/// transition is never lost.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    running: AtomicU64,
    zero: Notify,
}

impl WaitGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self) {
        self.inner.running.fetch_add(1, Ordering::AcqRel);
    }

    pub fn done(&self) {
        let previous = self
            .inner
            .running
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        match previous {
            Ok(1) => self.inner.zero.notify_one(),
            Ok(_) => {}
            Err(_) => error!("WaitGroup::done called without a matching add"),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.running.load(Ordering::Acquire)
    }

    /// `add` now, `done` when the returned guard drops.
    #[must_use]
    pub fn guard(&self) -> WaitGroupGuard {
        self.add();
        WaitGroupGuard {
            group: self.clone(),
        }
    }

    /// Waits until the counter is zero. Returns immediately if it already is.
    pub async fn wait(&self) {
        loop {
            if self.count() == 0 {
                return;
            }
            let notified = self.inner.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Outstanding unit of work; calls `done` on drop, including unwinds.
#[derive(Debug)]
pub struct WaitGroupGuard {
    group: WaitGroup,
}

impl Drop for WaitGroupGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
