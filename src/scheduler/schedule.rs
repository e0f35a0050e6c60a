//! # The scheduler capability.
//!
//! [`Schedule`] is the seam between pipelines and execution contexts:
//! `subscribe_on`/`publish_on` only ever see `Arc<dyn Schedule>`, so a
//! single-threaded cooperative scheduler and a parallel worker pool are
//! interchangeable.
//!
//! ## Rules
//! - `schedule` never blocks and never runs the work inline; it either
//!   accepts the unit or returns a [`ScheduleError`].
//! - A rejected unit is the caller's problem to surface (the bridge turns
//!   it into a terminal `Error` signal, see
//!   [`FlowError::SchedulerRejected`](crate::FlowError::SchedulerRejected)).
//! - An accepted unit runs to completion; cancellation never preempts a
//!   unit already dispatched.

use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::ScheduleError;

/// A unit of work accepted by a scheduler.
pub type Work = BoxFuture<'static, ()>;

/// Shared handle to a scheduler.
pub type SchedulerRef = std::sync::Arc<dyn Schedule>;

/// Named execution context capable of running dispatched work.
pub trait Schedule: Send + Sync + 'static {
    /// Returns the scheduler's stable name (used in logs and rejection
    /// errors).
    fn name(&self) -> &str;

    /// Accepts a unit of work for execution, or rejects it.
    fn schedule(&self, work: Work) -> Result<(), ScheduleError>;

    /// Runs `work` after `delay`, returning a cancellable handle.
    ///
    /// Cancelling the handle before the delay elapses drops the work
    /// without running it; cancelling afterwards has no effect on an
    /// already-started unit.
    fn schedule_after(&self, delay: Duration, work: Work) -> Result<TimerHandle, ScheduleError> {
        let token = CancellationToken::new();
        let timer = token.clone();
        self.schedule(Box::pin(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(delay) => work.await,
            }
        }))?;
        Ok(TimerHandle::new(token))
    }
}

/// Cancellable handle to work scheduled with a delay.
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the timer. Idempotent; a no-op once the work has started.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once `cancel` was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
