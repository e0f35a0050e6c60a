//! # Function-backed subscriber.
//!
//! [`CallbackSubscriber`] adapts a plain closure into the [`Subscriber`]
//! capability set for the common "just give me every value" case: it
//! requests unbounded demand on subscribe and invokes the closure per
//! value. Terminal signals are ignored apart from logging errors.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FlowError;

use super::{Subscriber, Subscription};

/// Subscriber built from a value callback.
///
/// # Example
/// ```
/// use flowvisor::{CallbackSubscriber, Publisher};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let publisher = Publisher::from_iter(vec![1u64, 2, 3]);
///     let subscription = publisher
///         .subscribe(CallbackSubscriber::arc(|value: u64| {
///             println!("got {value}");
///         }))
///         .await;
///     let _ = subscription;
/// }
/// ```
pub struct CallbackSubscriber<T, F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    callback: F,
    _marker: PhantomData<fn(T)>,
}

impl<T, F> CallbackSubscriber<T, F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    /// Creates a subscriber invoking `callback` for each value.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _marker: PhantomData,
        }
    }

    /// Convenience for the `Arc`-wrapped form `subscribe` expects.
    pub fn arc(callback: F) -> Arc<Self> {
        Arc::new(Self::new(callback))
    }
}

#[async_trait]
impl<T, F> Subscriber<T> for CallbackSubscriber<T, F>
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    fn on_subscribe(&self, subscription: &Subscription) {
        subscription.request_unbounded();
    }

    async fn on_next(&self, value: T) {
        (self.callback)(value);
    }

    async fn on_error(&self, error: FlowError) {
        eprintln!("[flowvisor] callback subscriber observed error: {error}");
    }

    async fn on_complete(&self) {}
}
