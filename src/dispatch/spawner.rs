use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;

type SpawnFn = dyn Fn(BoxFuture<'static, ()>) + Send + Sync;

/// How a request task gets scheduled.
///
/// Defaults to `tokio::spawn` on the current runtime.
#[derive(Clone)]
pub struct Spawner {
    spawn: Arc<SpawnFn>,
}

impl Spawner {
    #[must_use]
    pub fn new<F>(spawn: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        Self {
            spawn: Arc::new(spawn),
        }
    }

    /// Spawns request tasks onto a specific runtime.
    #[must_use]
    pub fn on(handle: Handle) -> Self {
        Self::new(move |task| drop(handle.spawn(task)))
    }

    pub(crate) fn spawn(&self, task: BoxFuture<'static, ()>) {
        (self.spawn)(task);
    }
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(|task| drop(tokio::spawn(task)))
    }
}

impl std::fmt::Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner").finish_non_exhaustive()
    }
}
