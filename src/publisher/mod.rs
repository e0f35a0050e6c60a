//! # Publishers: lazy recipes for signal sequences.
//!
//! A [`Publisher`] holds a producer closure and performs no work until
//! subscribed; each subscribe call is an independent execution with its
//! own channel and demand. This module provides:
//!
//! - the [`Publisher`] value itself (`subscribe`, `subscribe_on`,
//!   `publish_on`, `create`);
//! - the source constructors (`empty`, `just`, `from_iter`, `fail`,
//!   `defer`, `never`, `ticker`);
//! - the relay machinery backing `publish_on`.

mod publisher;
mod relay;
mod sources;

pub use publisher::Publisher;
