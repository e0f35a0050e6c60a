//! # Single-threaded worker scheduler.
//!
//! [`WorkerScheduler`] owns one named OS thread driving a current-thread
//! tokio runtime. Work dispatched here is serialized by construction,
//! which makes it the natural target for `publish_on` when consumer-side
//! effects must happen on one well-known thread.
//!
//! ## Shutdown
//! `shutdown()` (or dropping the scheduler) cancels the keepalive token;
//! the worker thread then drops the runtime, which cancels any still
//! queued units. Subsequent `schedule` calls are rejected with
//! [`ScheduleError::Shutdown`].

use tokio::runtime::{Builder, Handle};
use tokio_util::sync::CancellationToken;

use crate::error::ScheduleError;

use super::schedule::{Schedule, Work};

/// Dedicated single-threaded execution context.
pub struct WorkerScheduler {
    name: String,
    handle: Handle,
    shutdown: CancellationToken,
}

impl WorkerScheduler {
    /// Builds the runtime and spawns the named worker thread.
    ///
    /// The thread parks on the shutdown token while the runtime drives
    /// dispatched work; the OS thread name equals `name`.
    pub fn new(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        std::thread::Builder::new().name(name.clone()).spawn(move || {
            runtime.block_on(token.cancelled());
            // Dropping the runtime here (outside any async context)
            // cancels whatever is still queued.
        })?;

        Ok(Self {
            name,
            handle,
            shutdown,
        })
    }

    /// Stops accepting work and releases the worker thread. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// True once `shutdown` was called (or the scheduler was dropped).
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Schedule for WorkerScheduler {
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

impl Drop for WorkerScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
