//! # Relay stage: moving delivery between execution contexts.
//!
//! [`publish_on`] puts a bounded queue between an upstream execution and
//! the downstream consumer, with the drain loop running on a designated
//! scheduler. The queue capacity doubles as the upstream prefetch: one
//! replenishing `request(1)` follows every value handed downstream, so
//! upstream production never outruns the queue.
//!
//! ```text
//! publish_on:
//!   upstream ──on_next──► tx ─(bounded mpsc)─ rx ──drain──► consumer
//!              ▲                                   │ on scheduler
//!              └────────── request(1) per value ───┘
//! ```
//!
//! The drain loop is the only task touching the downstream channel, so
//! delivery stays serialized across the context switch.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::FlowError;
use crate::scheduler::SchedulerRef;
use crate::signal::{Emitter, Signal, Subscriber, Subscription};

use super::Publisher;

/// Wraps `upstream` so that all downstream signal delivery happens on
/// `scheduler`, buffering at most `capacity` signals in flight.
pub(crate) fn publish_on<T: Send + 'static>(
    upstream: Publisher<T>,
    scheduler: SchedulerRef,
    capacity: usize,
) -> Publisher<T> {
    Publisher::create(move |emitter: Emitter<T>| {
        let upstream = upstream.clone();
        let scheduler = Arc::clone(&scheduler);
        Box::pin(async move {
            let (tx, rx) = mpsc::channel::<Signal<T>>(capacity);
            let bridge = Arc::new(RelaySubscriber {
                tx,
                prefetch: capacity as u64,
                upstream: Mutex::new(None),
            });
            let subscription = upstream.subscribe(bridge).await;

            let drain_emitter = emitter.clone();
            let drain_subscription = subscription.clone();
            let dispatched = scheduler.schedule(Box::pin(async move {
                drain(rx, drain_emitter, drain_subscription).await;
            }));
            if let Err(error) = dispatched {
                subscription.cancel();
                emitter.error(FlowError::from(error)).await;
            }
        })
    })
}

/// Drains the relay queue on the designated scheduler, forwarding each
/// signal downstream and replenishing upstream demand one-for-one.
async fn drain<T: Send + 'static>(
    mut rx: mpsc::Receiver<Signal<T>>,
    emitter: Emitter<T>,
    upstream: Subscription,
) {
    loop {
        tokio::select! {
            _ = emitter.interrupted() => {
                emitter.surface_violation().await;
                upstream.cancel();
                return;
            }
            signal = rx.recv() => match signal {
                Some(Signal::Next(value)) => {
                    if emitter.next(value).await.is_err() {
                        upstream.cancel();
                        return;
                    }
                    upstream.request(1);
                }
                Some(Signal::Error(error)) => {
                    emitter.error(error).await;
                    return;
                }
                Some(Signal::Complete) => {
                    emitter.complete().await;
                    return;
                }
                None => {
                    // Sender side dropped without a terminal signal: the
                    // upstream execution died before producing one. The
                    // downstream subscription still gets its terminal.
                    emitter
                        .error(FlowError::producer(
                            "upstream dropped without a terminal signal",
                        ))
                        .await;
                    return;
                }
            },
        }
    }
}

/// Upstream-facing side of a `publish_on` stage. Feeds every signal into
/// the bounded queue; queue backpressure is what slows the upstream down.
struct RelaySubscriber<T: Send + 'static> {
    tx: mpsc::Sender<Signal<T>>,
    prefetch: u64,
    upstream: Mutex<Option<Subscription>>,
}

impl<T: Send + 'static> RelaySubscriber<T> {
    fn cancel_upstream(&self) {
        let guard = match self.upstream.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(subscription) = guard.as_ref() {
            subscription.cancel();
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Subscriber<T> for RelaySubscriber<T> {
    fn on_subscribe(&self, subscription: &Subscription) {
        if let Ok(mut guard) = self.upstream.lock() {
            *guard = Some(subscription.clone());
        }
        subscription.request(self.prefetch);
    }

    async fn on_next(&self, value: T) {
        if self.tx.send(Signal::Next(value)).await.is_err() {
            // Drain side is gone; stop the upstream execution.
            self.cancel_upstream();
        }
    }

    async fn on_error(&self, error: FlowError) {
        let _ = self.tx.send(Signal::Error(error)).await;
    }

    async fn on_complete(&self) {
        let _ = self.tx.send(Signal::Complete).await;
    }
}
