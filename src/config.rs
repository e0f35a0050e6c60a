//! # Global engine configuration.
//!
//! Provides [`Config`], centralized settings for the flowvisor engine.
//!
//! Config is used in two ways:
//! 1. **Default schedulers**: `defaults::install(&config)` sizes the
//!    process-wide elastic scheduler before first use.
//! 2. **Relay sizing**: `Publisher::publish_on` takes its queue capacity
//!    from `Config::default()` unless given one explicitly.
//!
//! ## Sentinel values
//! - `relay_capacity = 0` → clamped to 1 (a relay always buffers at least one signal)
//! - `elastic_threads = 0` → default thread count (4)

/// Global configuration for the flowvisor engine.
///
/// ## Field semantics
/// - `relay_capacity`: bounded queue size between a producer and a
///   `publish_on` drain worker. Also the upstream prefetch amount.
/// - `elastic_threads`: thread count for the default elastic scheduler
///   (the context designated for blocking work).
///
/// ## Notes
/// All fields are public for flexibility. Prefer the clamp accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the signal queue used by `publish_on` relays.
    ///
    /// The relay requests this many items from upstream as prefetch and
    /// replenishes demand one-for-one as signals are drained downstream.
    /// `0` is clamped to 1.
    pub relay_capacity: usize,

    /// Worker thread count for the default elastic scheduler.
    ///
    /// Blocking producers and consumers dispatched via `subscribe_on` /
    /// `publish_on` to the elastic scheduler occupy one of these threads
    /// for the duration of each blocking call. `0` = default (4).
    pub elastic_threads: usize,
}

impl Config {
    /// Returns the relay capacity clamped to a minimum of 1.
    #[inline]
    pub fn relay_capacity_clamped(&self) -> usize {
        self.relay_capacity.max(1)
    }

    /// Returns the elastic thread count with the `0` sentinel resolved.
    #[inline]
    pub fn elastic_threads_clamped(&self) -> usize {
        if self.elastic_threads == 0 {
            4
        } else {
            self.elastic_threads
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `relay_capacity = 32` (bounded prefetch, keeps consumer context busy)
    /// - `elastic_threads = 4` (modest pool for blocking work)
    fn default() -> Self {
        Self {
            relay_capacity: 32,
            elastic_threads: 4,
        }
    }
}
