//! # The `Publisher` value and its scheduler bridge.
//!
//! A publisher is a value holding a closure that knows how to drive an
//! [`Emitter`]; composition is function composition, not subclassing.
//! Subscribing:
//!
//! ```text
//! subscribe(consumer)
//!   ├─ establish channel       (on_subscribe runs here, synchronously)
//!   ├─ wrap producer future    (panic → terminal Producer error)
//!   ├─ dispatch onto scheduler (subscribe_on target, or ambient runtime)
//!   │     └─ rejection → terminal SchedulerRejected error
//!   └─ return Subscription     (without awaiting production)
//! ```
//!
//! ## Scheduler bridge
//! - [`subscribe_on`](Publisher::subscribe_on) picks where the producer
//!   closure runs — including any upstream subscribe the closure performs
//!   (`defer`, `publish_on` stages), so the whole chain upward moves.
//!   The last `subscribe_on` applied wins.
//! - [`publish_on`](Publisher::publish_on) moves downstream delivery onto
//!   a scheduler via a bounded relay; production stays where it was.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::config::Config;
use crate::error::{FlowError, ScheduleError};
use crate::scheduler::SchedulerRef;
use crate::signal::{establish, panic_message, Emitter, Subscriber, Subscription};

use super::relay;

pub(crate) type ProducerFn<T> = dyn Fn(Emitter<T>) -> BoxFuture<'static, ()> + Send + Sync;

/// Lazy, re-subscribable recipe for a sequence of values.
///
/// Immutable once constructed; cloning shares the recipe, not any
/// execution state.
pub struct Publisher<T: Send + 'static> {
    producer: Arc<ProducerFn<T>>,
    scheduler: Option<SchedulerRef>,
}

impl<T: Send + 'static> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: Send + 'static> Publisher<T> {
    /// Builds a publisher from a custom producer closure.
    ///
    /// The closure is invoked once per subscription with that
    /// subscription's [`Emitter`]. A panic inside the produced future is
    /// captured and delivered as a terminal
    /// [`FlowError::Producer`] error.
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(Emitter<T>) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
            scheduler: None,
        }
    }

    /// Starts an independent execution delivering to `subscriber`.
    ///
    /// `on_subscribe` runs synchronously inside this call; the producer is
    /// dispatched and this call returns without awaiting production.
    /// Scheduler rejection is delivered as a terminal error signal, never
    /// thrown.
    pub async fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Subscription {
        let (subscription, emitter) = establish(subscriber);
        let work = self.guarded(&emitter);

        let dispatched = match &self.scheduler {
            Some(scheduler) => scheduler.schedule(work),
            None => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(work);
                    Ok(())
                }
                Err(_) => Err(ScheduleError::NoRuntime),
            },
        };
        if let Err(error) = dispatched {
            emitter.error(FlowError::from(error)).await;
        }

        subscription
    }

    /// Runs this publisher's producer against an already established
    /// channel.
    ///
    /// Used by composing stages (`defer`) that splice an inner execution
    /// into their own subscription instead of opening a second one: the
    /// inner producer becomes the single task driving the shared channel,
    /// so delivery stays serialized and demand wakeups have one waiter.
    /// With no `subscribe_on` target the producer runs inline on the
    /// caller's context; otherwise it is dispatched onto its scheduler and
    /// this returns once dispatch was accepted.
    pub(crate) async fn drive(&self, emitter: Emitter<T>) {
        let work = self.guarded(&emitter);
        match &self.scheduler {
            Some(scheduler) => {
                if let Err(error) = scheduler.schedule(work) {
                    emitter.error(FlowError::from(error)).await;
                }
            }
            None => work.await,
        }
    }

    /// Producer future with panic capture: a panic inside the producer is
    /// delivered as a terminal `Producer` error.
    fn guarded(&self, emitter: &Emitter<T>) -> BoxFuture<'static, ()> {
        let guard = emitter.clone();
        let producing = (self.producer)(emitter.clone());
        Box::pin(async move {
            if let Err(panic) = AssertUnwindSafe(producing).catch_unwind().await {
                guard
                    .error(FlowError::Producer {
                        error: panic_message(panic.as_ref()),
                    })
                    .await;
            }
        })
    }

    /// Dispatches this publisher's production (and everything it does
    /// upstream) onto `scheduler`. The subscribe call still returns
    /// immediately.
    #[must_use]
    pub fn subscribe_on(mut self, scheduler: SchedulerRef) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Moves downstream signal delivery onto `scheduler` with the default
    /// relay capacity; production stays on its current context.
    #[must_use]
    pub fn publish_on(self, scheduler: SchedulerRef) -> Self {
        let capacity = Config::default().relay_capacity_clamped();
        relay::publish_on(self, scheduler, capacity)
    }

    /// [`publish_on`](Self::publish_on) with an explicit relay queue
    /// capacity (also the upstream prefetch amount; clamped to 1).
    #[must_use]
    pub fn publish_on_with_capacity(self, scheduler: SchedulerRef, capacity: usize) -> Self {
        relay::publish_on(self, scheduler, capacity.max(1))
    }
}
