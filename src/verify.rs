//! # Test-support consumer.
//!
//! [`TestSubscriber`] records every signal it receives and lets a test
//! drive demand by hand, then assert on the recorded history:
//!
//! ```text
//! let consumer = TestSubscriber::<u64>::with_demand(0);
//! publisher.subscribe(consumer.clone()).await;
//! consumer.request(1);
//! consumer.await_next_count(1).await;
//! consumer.await_terminal().await;
//! assert_eq!(consumer.values(), vec![7]);
//! ```
//!
//! The awaiting helpers never time out on their own; wrap them in
//! `tokio::time::timeout` to bound a test.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::FlowError;
use crate::signal::{Subscriber, Subscription};

struct Recorded<T> {
    values: Vec<T>,
    error: Option<FlowError>,
    completed: bool,
    subscribe_calls: u32,
}

/// Recording consumer with manually driven demand.
///
/// Constructed behind an `Arc` so the same instance can be handed to
/// `subscribe` and kept for assertions.
pub struct TestSubscriber<T: Send + 'static> {
    recorded: Mutex<Recorded<T>>,
    subscription: Mutex<Option<Subscription>>,
    changed: Notify,
    /// `None` requests unbounded demand on subscribe; `Some(0)` requests
    /// nothing at all.
    initial_demand: Option<u64>,
}

impl<T: Send + 'static> TestSubscriber<T> {
    /// A consumer that requests `n` units on subscribe (`0` requests
    /// nothing, leaving the test in full control of demand).
    pub fn with_demand(n: u64) -> Arc<Self> {
        Arc::new(Self::build(Some(n)))
    }

    /// A consumer that requests unbounded demand on subscribe.
    pub fn unbounded() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    fn build(initial_demand: Option<u64>) -> Self {
        Self {
            recorded: Mutex::new(Recorded {
                values: Vec::new(),
                error: None,
                completed: false,
                subscribe_calls: 0,
            }),
            subscription: Mutex::new(None),
            changed: Notify::new(),
            initial_demand,
        }
    }

    /// Grants `n` more units of demand on the held subscription.
    pub fn request(&self, n: u64) {
        if let Some(subscription) = self.held() {
            subscription.request(n);
        }
    }

    /// Cancels the held subscription.
    pub fn cancel(&self) {
        if let Some(subscription) = self.held() {
            subscription.cancel();
        }
    }

    /// Number of values received so far.
    #[must_use]
    pub fn next_count(&self) -> usize {
        self.recorded().values.len()
    }

    /// Terminal error, if one was received.
    #[must_use]
    pub fn error(&self) -> Option<FlowError> {
        self.recorded().error.clone()
    }

    /// True once `on_complete` was received.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.recorded().completed
    }

    /// True once either terminal signal was received.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        let recorded = self.recorded();
        recorded.completed || recorded.error.is_some()
    }

    /// Number of `on_subscribe` calls observed.
    #[must_use]
    pub fn subscribe_calls(&self) -> u32 {
        self.recorded().subscribe_calls
    }

    /// Suspends until at least `n` values were received.
    pub async fn await_next_count(&self, n: usize) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.next_count() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Suspends until a terminal signal was received.
    pub async fn await_terminal(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_terminated() {
                return;
            }
            notified.await;
        }
    }

    fn held(&self) -> Option<Subscription> {
        let guard = match self.subscription.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded<T>> {
        match self.recorded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T: Send + Clone + 'static> TestSubscriber<T> {
    /// All values received so far, in delivery order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.recorded().values.clone()
    }
}

#[async_trait]
impl<T: Send + 'static> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: &Subscription) {
        self.recorded().subscribe_calls += 1;
        {
            let mut held = match self.subscription.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if held.is_some() {
                // Already attached; the repeat attach gets no demand.
                self.changed.notify_waiters();
                return;
            }
            *held = Some(subscription.clone());
        }
        match self.initial_demand {
            None => subscription.request_unbounded(),
            Some(0) => {}
            Some(n) => subscription.request(n),
        }
        self.changed.notify_waiters();
    }

    async fn on_next(&self, value: T) {
        self.recorded().values.push(value);
        self.changed.notify_waiters();
    }

    async fn on_error(&self, error: FlowError) {
        self.recorded().error = Some(error);
        self.changed.notify_waiters();
    }

    async fn on_complete(&self) {
        self.recorded().completed = true;
        self.changed.notify_waiters();
    }
}
