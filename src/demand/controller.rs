//! # Outstanding-demand counter (the `request(n)` model).
//!
//! [`DemandController`] tracks how many more values a subscription is
//! allowed to deliver. The consumer side adds demand via `add`; the
//! producer's delivery loop consumes one unit per `Next` via `try_consume`.
//!
//! ## Rules
//! - The counter starts at 0; no delivery happens until demand is granted.
//! - `add` saturates: once cumulative demand crosses a very large floor the
//!   subscription is treated as **unbounded** and the counter is never
//!   decremented again.
//! - Both sides may run on different threads; all mutation goes through
//!   a CAS loop on a single atomic.
//!
//! Validation of the request amount is not this type's concern: `request(0)`
//! is rejected one level up (the subscription records a protocol violation
//! and the producer loop surfaces it as a terminal error).

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-subscription outstanding-demand counter.
///
/// Shared between the consumer (which increments via [`add`](Self::add))
/// and the producer's delivery loop (which decrements via
/// [`try_consume`](Self::try_consume)). The CAS loops ensure correctness
/// under concurrent access from both sides.
#[derive(Debug, Default)]
pub struct DemandController {
    /// Outstanding demand; pinned to [`Self::UNBOUNDED`] once saturated.
    outstanding: AtomicU64,
}

impl DemandController {
    /// Sentinel for unbounded demand.
    pub const UNBOUNDED: u64 = u64::MAX;

    /// Demand at or above this floor is treated as unbounded.
    const UNBOUNDED_FLOOR: u64 = u64::MAX / 2;

    /// Creates a controller with zero outstanding demand.
    #[must_use]
    pub fn new() -> Self {
        Self {
            outstanding: AtomicU64::new(0),
        }
    }

    /// Adds `n` units of demand and returns the new outstanding amount.
    ///
    /// Saturating: if the sum reaches the unbounded floor, the counter is
    /// pinned to [`Self::UNBOUNDED`] and stays there for the lifetime of
    /// the subscription.
    pub fn add(&self, n: u64) -> u64 {
        let mut current = self.outstanding.load(Ordering::Acquire);
        loop {
            let next = match current.checked_add(n) {
                Some(sum) if sum < Self::UNBOUNDED_FLOOR => sum,
                _ => Self::UNBOUNDED,
            };
            match self.outstanding.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(seen) => current = seen,
            }
        }
    }

    /// Attempts to consume one unit of demand.
    ///
    /// Returns `true` if demand was available (and decremented), `false` if
    /// the counter was 0. Unbounded demand is never decremented.
    #[inline]
    #[must_use]
    pub fn try_consume(&self) -> bool {
        let mut current = self.outstanding.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return false;
            }
            if current >= Self::UNBOUNDED_FLOOR {
                return true;
            }
            match self.outstanding.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(seen) => current = seen,
            }
        }
    }

    /// Returns the current outstanding demand.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::Acquire)
    }

    /// True once the subscription has saturated to unbounded demand.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.outstanding() >= Self::UNBOUNDED_FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_zero() {
        let demand = DemandController::new();
        assert_eq!(demand.outstanding(), 0);
        assert!(!demand.try_consume());
        assert!(!demand.try_consume());
    }

    #[test]
    fn test_add_then_consume_exactly() {
        let demand = DemandController::new();
        assert_eq!(demand.add(3), 3);
        assert!(demand.try_consume());
        assert!(demand.try_consume());
        assert!(demand.try_consume());
        assert!(!demand.try_consume());
        assert_eq!(demand.outstanding(), 0);
    }

    #[test]
    fn test_add_accumulates_across_requests() {
        let demand = DemandController::new();
        demand.add(2);
        demand.add(2);
        assert_eq!(demand.outstanding(), 4);
        for _ in 0..4 {
            assert!(demand.try_consume());
        }
        assert!(!demand.try_consume());
    }

    #[test]
    fn test_saturates_to_unbounded() {
        let demand = DemandController::new();
        demand.add(10);
        assert_eq!(demand.add(u64::MAX - 5), DemandController::UNBOUNDED);
        assert!(demand.is_unbounded());
        // Unbounded demand is never decremented.
        for _ in 0..1000 {
            assert!(demand.try_consume());
        }
        assert!(demand.is_unbounded());
    }

    #[test]
    fn test_floor_crossing_pins_counter() {
        let demand = DemandController::new();
        demand.add(u64::MAX / 2);
        assert_eq!(demand.outstanding(), DemandController::UNBOUNDED);
    }

    #[test]
    fn test_concurrent_request_and_consume() {
        let demand = Arc::new(DemandController::new());

        let granter = {
            let demand = Arc::clone(&demand);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    demand.add(25);
                }
            })
        };

        let consumer = {
            let demand = Arc::clone(&demand);
            std::thread::spawn(move || {
                let mut consumed = 0u64;
                while consumed < 5_000 {
                    if demand.try_consume() {
                        consumed += 1;
                    } else {
                        std::thread::yield_now();
                    }
                }
                consumed
            })
        };

        granter.join().unwrap();
        assert_eq!(consumer.join().unwrap(), 5_000);
        assert_eq!(demand.outstanding(), 0);
    }
}
