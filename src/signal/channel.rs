//! # Producer-side channel: demand-gated, serialized signal delivery.
//!
//! [`establish`] wires one [`Subscriber`] to a fresh [`Subscription`] and
//! returns the [`Emitter`] the producer drives. All delivery goes through
//! the emitter on a single producer task, so signals on one subscription
//! are strictly ordered and never concurrent, regardless of which
//! schedulers the pipeline spans.
//!
//! ## Delivery rules
//! ```text
//! next(value):   wait for demand ──► consume 1 unit ──► on_next(value)
//!                  │
//!                  ├─ cancel observed   ──► stop, no signal
//!                  ├─ violation pending ──► on_error(IllegalDemand), stop
//!                  └─ on_next panicked  ──► on_error(ConsumerPanicked), stop
//!
//! complete()/error(e): first claim wins; nothing is delivered after a
//! terminal signal or after a cancel was observed.
//! ```
//!
//! A panic inside a terminal callback (`on_error`/`on_complete`) has no
//! further signal to carry it, so it is caught and logged.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::error::FlowError;

use super::{Subscriber, Subscription, SubscriptionState};

/// Why an emission could not be delivered.
///
/// Producers treat any variant as "stop producing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    /// The consumer cancelled the subscription.
    Cancelled,
    /// A terminal signal was already delivered (or is being delivered).
    Terminated,
}

/// Producer-side handle of one subscription.
///
/// Cloneable so that dispatch wrappers can keep a handle for fault
/// reporting while the producer owns the primary one; all clones share the
/// same subscription state, and the terminal-claim flag keeps delivery
/// exactly-once across them.
pub struct Emitter<T: Send + 'static> {
    subscriber: Arc<dyn Subscriber<T>>,
    state: Arc<SubscriptionState>,
}

impl<T: Send + 'static> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            subscriber: Arc::clone(&self.subscriber),
            state: Arc::clone(&self.state),
        }
    }
}

/// Creates the channel for one subscribe call.
///
/// Invokes `on_subscribe` exactly once, synchronously, before returning —
/// and therefore before any other signal can exist.
pub fn establish<T: Send + 'static>(
    subscriber: Arc<dyn Subscriber<T>>,
) -> (Subscription, Emitter<T>) {
    let state = SubscriptionState::new();
    let subscription = Subscription::new(Arc::clone(&state));
    subscriber.on_subscribe(&subscription);
    (subscription, Emitter { subscriber, state })
}

impl<T: Send + 'static> Emitter<T> {
    /// Delivers one value, waiting until a unit of demand is available.
    ///
    /// Returns `Err` when the producer must stop: the subscription was
    /// cancelled, already terminated, a protocol violation was surfaced,
    /// or the consumer panicked (in which case the panic has already been
    /// delivered as a terminal `ConsumerPanicked` error).
    pub async fn next(&self, value: T) -> Result<(), EmitError> {
        self.await_demand().await?;
        let delivery = self.subscriber.on_next(value);
        match AssertUnwindSafe(delivery).catch_unwind().await {
            Ok(()) => Ok(()),
            Err(panic) => {
                self.error(FlowError::ConsumerPanicked {
                    error: panic_message(panic.as_ref()),
                })
                .await;
                Err(EmitError::Terminated)
            }
        }
    }

    /// Delivers the terminal completion signal, unless a terminal signal
    /// was already delivered or a cancel was observed.
    pub async fn complete(&self) {
        if self.state.is_cancelled() || !self.state.try_claim_terminal() {
            return;
        }
        let delivery = self.subscriber.on_complete();
        if let Err(panic) = AssertUnwindSafe(delivery).catch_unwind().await {
            eprintln!(
                "[flowvisor] consumer panicked in on_complete: {}",
                panic_message(panic.as_ref())
            );
        }
    }

    /// Delivers the terminal error signal, unless a terminal signal was
    /// already delivered or a cancel was observed.
    pub async fn error(&self, error: FlowError) {
        if self.state.is_cancelled() || !self.state.try_claim_terminal() {
            return;
        }
        let delivery = self.subscriber.on_error(error);
        if let Err(panic) = AssertUnwindSafe(delivery).catch_unwind().await {
            eprintln!(
                "[flowvisor] consumer panicked in on_error: {}",
                panic_message(panic.as_ref())
            );
        }
    }

    /// Suspends until the subscription is cancelled, terminated, or a
    /// protocol violation needs surfacing.
    ///
    /// Timer-driven and otherwise idle producers park here (typically in a
    /// `select!` against their own timer) so that a `request(0)` or cancel
    /// still interrupts them promptly. Follow up with
    /// [`surface_violation`](Self::surface_violation).
    pub async fn interrupted(&self) {
        loop {
            if self.state.is_cancelled()
                || self.state.is_terminated()
                || self.state.has_violation()
            {
                return;
            }
            self.state.producer_wait().await;
        }
    }

    /// Delivers a pending protocol violation as the terminal error, if one
    /// was recorded. Returns `true` if a violation was surfaced.
    pub async fn surface_violation(&self) -> bool {
        match self.state.take_violation() {
            Some(error) => {
                self.error(error).await;
                true
            }
            None => false,
        }
    }

    /// Waits until the consumer cancels the subscription.
    pub async fn cancelled(&self) {
        self.state.wait_cancelled().await;
    }

    /// True once the consumer cancelled the subscription.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// True while no terminal signal was delivered and no cancel observed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.state.is_terminated() && !self.state.is_cancelled()
    }

    /// Waits for one unit of demand and consumes it.
    async fn await_demand(&self) -> Result<(), EmitError> {
        loop {
            if self.state.is_terminated() {
                return Err(EmitError::Terminated);
            }
            if self.state.is_cancelled() {
                return Err(EmitError::Cancelled);
            }
            if let Some(error) = self.state.take_violation() {
                self.error(error).await;
                return Err(EmitError::Terminated);
            }
            if self.state.demand().try_consume() {
                return Ok(());
            }
            self.state.producer_wait().await;
        }
    }
}

/// Extracts a printable message from a captured panic payload.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic payload of unknown type".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::TestSubscriber;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_on_subscribe_runs_before_establish_returns() {
        let consumer = TestSubscriber::<u64>::with_demand(1);
        let (_subscription, _emitter) = establish(consumer.clone());
        assert_eq!(consumer.subscribe_calls(), 1);
    }

    #[tokio::test]
    async fn test_next_waits_for_demand() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        let (subscription, emitter) = establish(consumer.clone());

        let producer = tokio::spawn(async move {
            let _ = emitter.next(7).await;
            emitter.complete().await;
        });

        assert_eq!(consumer.next_count(), 0);
        subscription.request(1);
        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.values(), vec![7]);
        assert!(consumer.is_completed());
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn test_terminal_is_delivered_once() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let (_subscription, emitter) = establish(consumer.clone());

        emitter.complete().await;
        emitter.error(FlowError::producer("late")).await;
        emitter.complete().await;

        assert!(consumer.is_completed());
        assert_eq!(consumer.error(), None);
    }

    #[tokio::test]
    async fn test_no_signal_after_cancel_observed() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let (subscription, emitter) = establish(consumer.clone());

        subscription.cancel();
        assert_eq!(emitter.next(1).await, Err(EmitError::Cancelled));
        emitter.complete().await;

        assert_eq!(consumer.next_count(), 0);
        assert!(!consumer.is_terminated());
    }

    #[tokio::test]
    async fn test_request_zero_surfaces_illegal_demand() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        let (subscription, emitter) = establish(consumer.clone());

        let producer = tokio::spawn(async move {
            let _ = emitter.next(1).await;
        });

        subscription.request(0);
        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(
            consumer.error(),
            Some(FlowError::IllegalDemand { requested: 0 })
        );
        assert_eq!(consumer.next_count(), 0);
        producer.await.unwrap();
    }

    struct Panicky;

    #[async_trait]
    impl Subscriber<u64> for Panicky {
        fn on_subscribe(&self, subscription: &Subscription) {
            subscription.request_unbounded();
        }

        async fn on_next(&self, _value: u64) {
            panic!("consumer blew up");
        }

        async fn on_error(&self, _error: FlowError) {}

        async fn on_complete(&self) {}
    }

    #[tokio::test]
    async fn test_consumer_panic_terminates_with_error() {
        let (subscription, emitter) = establish::<u64>(Arc::new(Panicky));

        assert_eq!(emitter.next(1).await, Err(EmitError::Terminated));
        assert!(subscription.is_terminated());
        // Nothing further may be delivered.
        assert_eq!(emitter.next(2).await, Err(EmitError::Terminated));
    }

    #[tokio::test]
    async fn test_interrupted_returns_on_cancel() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let (subscription, emitter) = establish(consumer.clone());

        let parked = tokio::spawn(async move {
            emitter.interrupted().await;
            emitter.surface_violation().await
        });

        subscription.cancel();
        let surfaced = timeout(WAIT, parked).await.unwrap().unwrap();
        assert!(!surfaced);
    }

    #[tokio::test]
    async fn test_interrupted_surfaces_violation() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        let (subscription, emitter) = establish(consumer.clone());

        let parked = tokio::spawn(async move {
            emitter.interrupted().await;
            emitter.surface_violation().await
        });

        subscription.request(0);
        let surfaced = timeout(WAIT, parked).await.unwrap().unwrap();
        assert!(surfaced);
        assert_eq!(
            consumer.error(),
            Some(FlowError::IllegalDemand { requested: 0 })
        );
    }
}
