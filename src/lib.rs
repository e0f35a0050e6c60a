//! # flowvisor
//!
//! **Flowvisor** is a demand-driven streaming engine for Rust.
//!
//! It provides primitives to describe lazy value sequences as
//! [`Publisher`]s, consume them through demand-gated [`Subscriber`]s, and
//! move production or delivery between execution contexts with dedicated
//! schedulers. The crate is designed as a building block for pipelines
//! that bridge blocking and non-blocking worlds.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Publisher   │   │  Publisher   │   │  Publisher   │
//!     │ (from_iter)  │   │   (defer)    │   │   (ticker)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ subscribe        │ subscribe        │ subscribe
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Signal channel (one per subscribe call)                      │
//! │  - Emitter (producer side, serialized delivery)               │
//! │  - Subscription (consumer side: request / cancel)             │
//! │  - DemandController (atomic outstanding-demand counter)       │
//! └──────┬──────────────────────┬─────────────────────────┬───────┘
//!        │ dispatch             │ dispatch                │
//!        ▼                      ▼                         ▼
//! ┌──────────────┐   ┌───────────────────┐   ┌────────────────────┐
//! │ ambient tokio│   │  WorkerScheduler  │   │  ElasticScheduler  │
//! │   runtime    │   │ (one named thread)│   │  (blocking pool)   │
//! └──────────────┘   └───────────────────┘   └────────────────────┘
//! ```
//!
//! ### Signal flow
//! ```text
//! Publisher::subscribe(consumer)
//!   ├─► on_subscribe(subscription)         (synchronous, exactly once)
//!   ├─► producer dispatched to a scheduler (subscribe_on target, else
//!   │                                       the ambient runtime)
//!   └─► returns Subscription
//!
//! producer loop {
//!   ├─► await demand      (request(n) accumulates, saturating)
//!   ├─► on_next(value)    (serialized; consumer panic ─► ConsumerPanicked)
//!   └─► exit conditions:
//!        - cancel observed          ─► stop, no further signal
//!        - request(0) violation     ─► on_error(IllegalDemand)
//!        - source exhausted         ─► on_complete()
//!        - source failed / panicked ─► on_error(...)
//! }
//!
//! Exactly one terminal signal per subscription; nothing after it.
//! ```
//!
//! ## Features
//! | Area            | Description                                                  | Key types / traits                         |
//! |-----------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Publishers**  | Lazy, re-subscribable sequence recipes and combinators.      | [`Publisher`]                              |
//! | **Consumers**   | Demand-gated signal handling.                                | [`Subscriber`], [`CallbackSubscriber`]     |
//! | **Demand**      | Saturating outstanding-demand accounting.                    | [`DemandController`], [`Subscription`]     |
//! | **Schedulers**  | Dedicated execution contexts and the bridge into them.       | [`Schedule`], [`WorkerScheduler`], [`ElasticScheduler`] |
//! | **Errors**      | Typed errors for stream faults and dispatch failures.        | [`FlowError`], [`ScheduleError`]           |
//! | **Configuration** | Centralize relay and pool sizing.                          | [`Config`]                                 |
//! | **Verification** | Recording consumer for driving tests by hand.               | [`verify::TestSubscriber`]                 |
//!
//! ## Example
//! ```rust
//! use flowvisor::{defaults, CallbackSubscriber, Publisher};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() {
//!     // A blocking fetch, kept off the async runtime: the deferred
//!     // factory runs on the elastic pool, delivery lands on the shared
//!     // single-thread worker.
//!     let users = Publisher::defer(|| {
//!         // e.g. a synchronous repository call
//!         Publisher::from_iter(vec!["swhite", "jpinkman"])
//!     })
//!     .subscribe_on(defaults::elastic())
//!     .publish_on(defaults::single());
//!
//!     let printer = CallbackSubscriber::arc(|name: &str| println!("user: {name}"));
//!     let subscription = users.subscribe(printer).await;
//!     let _ = subscription;
//! }
//! ```
mod config;
mod demand;
mod error;
mod publisher;
mod scheduler;
mod signal;

pub mod verify;

// ---- Public re-exports ----

pub use config::Config;
pub use demand::DemandController;
pub use error::{FlowError, ScheduleError};
pub use publisher::Publisher;
pub use scheduler::defaults;
pub use scheduler::{
    ElasticScheduler, RuntimeScheduler, Schedule, SchedulerRef, TimerHandle, Work, WorkerScheduler,
};
pub use signal::{CallbackSubscriber, EmitError, Emitter, Signal, Subscriber, Subscription};
