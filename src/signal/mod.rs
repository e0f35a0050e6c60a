//! # Signal channel: the subscription protocol core.
//!
//! This module implements the single-producer/single-consumer protocol
//! carrying `Next`, `Error`, and `Complete` signals under bounded demand:
//!
//! - [`Signal`] — the tagged signal variant.
//! - [`Subscriber`] — the consumer capability set
//!   (`on_subscribe`/`on_next`/`on_error`/`on_complete`).
//! - [`Subscription`] — the consumer-side handle (`request`/`cancel`).
//! - [`Emitter`] — the producer-side handle with demand-gated delivery.
//! - [`CallbackSubscriber`] — function-backed consumer for simple cases.

mod callback;
mod channel;
mod signal;
mod subscriber;
mod subscription;

pub use callback::CallbackSubscriber;
pub use channel::{establish, EmitError, Emitter};
pub use signal::Signal;
pub use subscriber::Subscriber;
pub use subscription::Subscription;

pub(crate) use channel::panic_message;
pub(crate) use subscription::SubscriptionState;
