//! # Signal classification.
//!
//! A subscription carries zero or more `Next` signals followed by at most
//! one terminal signal (`Error` or `Complete`). The engine enforces that
//! nothing follows a terminal signal; this enum is the value that relays
//! and queues move around.

use crate::error::FlowError;

/// One signal on a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T> {
    /// A value delivery; consumes one unit of granted demand.
    Next(T),
    /// Terminal failure. Not demand-gated.
    Error(FlowError),
    /// Terminal successful completion. Not demand-gated.
    Complete,
}

impl<T> Signal<T> {
    /// True for `Error` and `Complete`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Signal::Error(_) | Signal::Complete)
    }
}
