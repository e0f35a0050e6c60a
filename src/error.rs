//! Error types used by the flowvisor engine.
//!
//! This module defines two main error enums:
//!
//! - [`FlowError`] — errors delivered through a subscription as a terminal
//!   `Error` signal.
//! - [`ScheduleError`] — errors raised by a scheduler when it cannot accept
//!   work.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging,
//! and a [`ScheduleError`] converts into a [`FlowError`] so scheduler faults
//! surface through the signal channel instead of escaping a subscribe call.

use thiserror::Error;

/// # Errors delivered as a terminal `Error` signal.
///
/// Every failure affecting a subscription becomes exactly one of these,
/// delivered once via `on_error`. Nothing in this taxonomy is ever thrown
/// synchronously out of `subscribe` or `request`.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A consumer requested non-positive demand (`request(0)`).
    ///
    /// The reactive-streams protocol treats non-positive requests as a
    /// violation: the subscription terminates with this error and no
    /// further `Next` is delivered.
    #[error("illegal demand: request({requested}) must be positive")]
    IllegalDemand {
        /// The offending requested amount.
        requested: u64,
    },

    /// The producer's work function failed while generating a value.
    #[error("producer failed: {error}")]
    Producer {
        /// The underlying failure message.
        error: String,
    },

    /// A scheduler could not accept work the pipeline needed to dispatch.
    #[error("scheduler '{scheduler}' rejected work: {reason}")]
    SchedulerRejected {
        /// Name of the rejecting scheduler.
        scheduler: String,
        /// Why the work was rejected.
        reason: String,
    },

    /// The consumer's own `on_next` panicked.
    ///
    /// The panic is captured, the subscription terminates, and this error is
    /// delivered to the same consumer's `on_error`.
    #[error("consumer panicked: {error}")]
    ConsumerPanicked {
        /// The captured panic message.
        error: String,
    },
}

impl FlowError {
    /// Creates a [`FlowError::Producer`] from any failure message.
    pub fn producer(error: impl Into<String>) -> Self {
        FlowError::Producer {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use flowvisor::FlowError;
    ///
    /// let err = FlowError::IllegalDemand { requested: 0 };
    /// assert_eq!(err.as_label(), "illegal_demand");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::IllegalDemand { .. } => "illegal_demand",
            FlowError::Producer { .. } => "producer_failure",
            FlowError::SchedulerRejected { .. } => "scheduler_rejected",
            FlowError::ConsumerPanicked { .. } => "consumer_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::IllegalDemand { requested } => {
                format!("illegal demand: {requested}")
            }
            FlowError::Producer { error } => format!("producer failure: {error}"),
            FlowError::SchedulerRejected { scheduler, reason } => {
                format!("scheduler '{scheduler}' rejected work: {reason}")
            }
            FlowError::ConsumerPanicked { error } => format!("consumer panic: {error}"),
        }
    }

    /// Indicates whether this error is a reactive-streams protocol violation
    /// (as opposed to a producer, consumer, or scheduler fault).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, FlowError::IllegalDemand { .. })
    }
}

/// # Errors produced when a scheduler cannot accept work.
///
/// Raised at dispatch points (`schedule`, `schedule_after`, subscribe-time
/// producer dispatch). The bridge converts these into
/// [`FlowError::SchedulerRejected`] and delivers them through the channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The scheduler has been shut down and accepts no new work.
    #[error("scheduler '{scheduler}' is shut down")]
    Shutdown {
        /// Name of the shut-down scheduler.
        scheduler: String,
    },

    /// No ambient tokio runtime was available for default dispatch.
    #[error("no runtime available for ambient scheduling")]
    NoRuntime,
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::Shutdown { .. } => "scheduler_shutdown",
            ScheduleError::NoRuntime => "no_runtime",
        }
    }
}

impl From<ScheduleError> for FlowError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Shutdown { scheduler } => FlowError::SchedulerRejected {
                scheduler,
                reason: "shut down".to_string(),
            },
            ScheduleError::NoRuntime => FlowError::SchedulerRejected {
                scheduler: "ambient".to_string(),
                reason: "no tokio runtime in scope".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(
            FlowError::IllegalDemand { requested: 0 }.as_label(),
            "illegal_demand"
        );
        assert_eq!(FlowError::producer("boom").as_label(), "producer_failure");
        assert_eq!(
            FlowError::ConsumerPanicked { error: "x".into() }.as_label(),
            "consumer_panicked"
        );
        assert_eq!(ScheduleError::NoRuntime.as_label(), "no_runtime");
    }

    #[test]
    fn test_schedule_error_becomes_rejection() {
        let err: FlowError = ScheduleError::Shutdown {
            scheduler: "elastic".into(),
        }
        .into();
        assert_eq!(err.as_label(), "scheduler_rejected");
        assert!(err.as_message().contains("elastic"));
    }

    #[test]
    fn test_protocol_violation_classification() {
        assert!(FlowError::IllegalDemand { requested: 0 }.is_protocol_violation());
        assert!(!FlowError::producer("boom").is_protocol_violation());
    }
}
