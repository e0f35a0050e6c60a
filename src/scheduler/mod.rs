//! # Schedulers: named execution contexts for offloaded work.
//!
//! A scheduler accepts a unit of work and runs it, possibly on a different
//! thread of control than the caller. The engine never assumes a single
//! global event loop: the implementations here are interchangeable behind
//! the [`Schedule`] capability.
//!
//! - [`RuntimeScheduler`] — dispatches onto an existing tokio runtime
//!   handle (the caller's own context, made explicit).
//! - [`WorkerScheduler`] — one dedicated, named OS thread driving a
//!   current-thread runtime; work on it is serialized.
//! - [`ElasticScheduler`] — a dedicated multi-thread runtime designated
//!   for blocking work, so blocking calls never starve a non-blocking
//!   context.
//! - [`defaults`] — lazily-built process-wide instances, injectable for
//!   tests via [`defaults::install`].

mod elastic;
mod runtime;
mod schedule;
mod worker;

pub mod defaults;

pub use elastic::ElasticScheduler;
pub use runtime::RuntimeScheduler;
pub use schedule::{Schedule, SchedulerRef, TimerHandle, Work};
pub use worker::WorkerScheduler;
