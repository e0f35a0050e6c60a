//! # Consumer capability set.
//!
//! Provides [`Subscriber`], the extension point a consumer implements to
//! receive signals from a publisher.
//!
//! ## Rules
//! - `on_subscribe` is invoked exactly once, synchronously, before any
//!   other signal, and hands over the [`Subscription`] handle.
//! - No `on_next` arrives before demand was requested.
//! - Signals are delivered serialized: no two callbacks for the same
//!   subscription are ever in flight concurrently, even when producer and
//!   consumer run on different schedulers.
//! - Exactly one of `on_error` / `on_complete` is the last signal, unless
//!   the subscription was cancelled first.
//! - A panic in `on_next` terminates the subscription: the panic is caught
//!   and delivered to this same subscriber's `on_error`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use flowvisor::{FlowError, Subscriber, Subscription};
//!
//! struct Collector;
//!
//! #[async_trait]
//! impl Subscriber<u64> for Collector {
//!     fn on_subscribe(&self, subscription: &Subscription) {
//!         subscription.request(1); // pull one value at a time
//!     }
//!
//!     async fn on_next(&self, value: u64) {
//!         let _ = value; // store it, then pull the next one
//!     }
//!
//!     async fn on_error(&self, error: FlowError) {
//!         let _ = error;
//!     }
//!
//!     async fn on_complete(&self) {}
//! }
//! ```

use async_trait::async_trait;

use crate::error::FlowError;

use super::Subscription;

/// Consumer of one subscription's signals.
///
/// Implementations should be cheap to call: slow consumers hold up the
/// producer loop (that is the backpressure working as intended), so move
/// genuinely blocking consumption behind `publish_on` with a scheduler
/// designated for blocking work.
#[async_trait]
pub trait Subscriber<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Receives the [`Subscription`] handle.
    ///
    /// Called exactly once, synchronously, inside the subscribe call and
    /// before any other signal. Request initial demand here (or keep the
    /// handle and request later).
    fn on_subscribe(&self, subscription: &Subscription);

    /// Receives one value. Called at most once per unit of granted demand.
    async fn on_next(&self, value: T);

    /// Receives the terminal error signal.
    async fn on_error(&self, error: FlowError);

    /// Receives the terminal completion signal.
    async fn on_complete(&self);
}
