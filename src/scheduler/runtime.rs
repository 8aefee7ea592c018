//! Tick sources backed by the Tokio event loop

use std::{future::Future, rc::Rc, time::Duration};
use tokio::task::{JoinHandle, LocalSet};
use tracing::debug;

use super::{Scheduler, TickCallback};
use crate::tasks::ticker_task;

/// Cancel handle for a tick source spawned by [`TokioScheduler`]
#[derive(Debug)]
pub struct TickHandle(JoinHandle<()>);

/// Scheduler that runs each tick source as a task on its own `LocalSet`
///
/// Scheduling never fails and never needs an ambient `LocalSet`; tick sources
/// are queued on the scheduler's set and only fire while the host drives it
/// with [`TokioScheduler::run_until`]. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    local: Rc<LocalSet>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive this scheduler's tick sources until `future` completes
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.local.run_until(future).await
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TickHandle;

    fn schedule_repeating(
        &self,
        callback: TickCallback,
        interval: Duration,
    ) -> Result<TickHandle, String> {
        debug!("Spawning local ticker task");
        Ok(TickHandle(self.local.spawn_local(ticker_task(interval, callback))))
    }

    fn cancel(&self, handle: TickHandle) {
        // Aborting from the owning thread means the task is never polled again
        handle.0.abort();
        debug!("Ticker task aborted");
    }
}
