//! # Scheduler over an existing tokio runtime.
//!
//! [`RuntimeScheduler`] makes the caller's own (or any other) runtime
//! available as an explicit [`Schedule`] value, rather than leaving the
//! dispatch target implicit in `tokio::spawn`.

use tokio::runtime::Handle;

use crate::error::ScheduleError;

use super::schedule::{Schedule, Work};

/// Dispatches work onto a tokio runtime via its [`Handle`].
///
/// The runtime's lifetime is not managed here; if the runtime shuts down,
/// accepted units are dropped by tokio without running.
pub struct RuntimeScheduler {
    name: String,
    handle: Handle,
}

impl RuntimeScheduler {
    /// Wraps an explicit runtime handle.
    pub fn new(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// Wraps the runtime the caller is currently running on.
    ///
    /// Fails with [`ScheduleError::NoRuntime`] outside a runtime context.
    pub fn try_current() -> Result<Self, ScheduleError> {
        Handle::try_current()
            .map(|handle| Self::new("runtime", handle))
            .map_err(|_| ScheduleError::NoRuntime)
    }
}

impl Schedule for RuntimeScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self, work: Work) -> Result<(), ScheduleError> {
        self.handle.spawn(work);
        Ok(())
    }
}
