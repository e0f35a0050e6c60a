//! # Elastic scheduler for blocking work.
//!
//! [`ElasticScheduler`] owns a dedicated multi-thread tokio runtime whose
//! units are allowed to block their thread (blocking fetches, synchronous
//! sinks). Keeping this pool separate from non-blocking contexts is what
//! lets `subscribe_on`/`publish_on` adapt blocking I/O into a pipeline
//! without starving it.

use tokio::runtime::{Builder, Handle};
use tokio_util::sync::CancellationToken;

use crate::error::ScheduleError;

use super::schedule::{Schedule, Work};

/// Dedicated worker-pool execution context for blocking work.
///
/// Each dispatched unit may occupy one pool thread for the duration of a
/// blocking call; size the pool (via `threads`) for the expected number of
/// concurrent blocking operations.
pub struct ElasticScheduler {
    name: String,
    handle: Handle,
    shutdown: CancellationToken,
}

impl ElasticScheduler {
    /// Builds a pool of `threads` workers; pool threads are named
    /// `{name}-N` by tokio, the keepalive thread `name`.
    pub fn new(name: impl Into<String>, threads: usize) -> std::io::Result<Self> {
        let name = name.into();
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads.max(1))
            .thread_name(name.clone())
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        std::thread::Builder::new().name(name.clone()).spawn(move || {
            runtime.block_on(token.cancelled());
        })?;

        Ok(Self {
            name,
            handle,
            shutdown,
        })
    }

    /// Stops accepting work and releases the pool. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// True once `shutdown` was called (or the scheduler was dropped).
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Schedule for ElasticScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self, work: Work) -> Result<(), ScheduleError> {
        if self.shutdown.is_cancelled() {
            return Err(ScheduleError::Shutdown {
                scheduler: self.name.clone(),
            });
        }
        self.handle.spawn(work);
        Ok(())
    }
}

impl Drop for ElasticScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_blocking_units_run_concurrently() {
        let scheduler = ElasticScheduler::new("flowvisor-test-elastic", 2).unwrap();
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();

        // Two deliberately blocking units; a pool of two absorbs both.
        scheduler
            .schedule(Box::pin(async move {
                std::thread::sleep(Duration::from_millis(50));
                let _ = tx_a.send(());
            }))
            .unwrap();
        scheduler
            .schedule(Box::pin(async move {
                std::thread::sleep(Duration::from_millis(50));
                let _ = tx_b.send(());
            }))
            .unwrap();

        timeout(Duration::from_secs(5), rx_a).await.unwrap().unwrap();
        timeout(Duration::from_secs(5), rx_b).await.unwrap().unwrap();
        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_work() {
        let scheduler = ElasticScheduler::new("flowvisor-elastic-down", 1).unwrap();
        scheduler.shutdown();
        assert!(scheduler.schedule(Box::pin(async {})).is_err());
        assert!(scheduler.is_shut_down());
    }
}
