//! # Subscription handle and shared per-subscription state.
//!
//! A [`Subscription`] is the single-use binding between one publisher
//! execution and one consumer. It is created fresh per subscribe call and
//! handed to the consumer in `on_subscribe`.
//!
//! ## Lifecycle
//! ```text
//! created ──► active ──► terminated (complete | error | cancelled)
//! ```
//! After termination the handle goes inert: `request` and `cancel` become
//! no-ops (not errors).
//!
//! ## Rules
//! - `request(0)` is a protocol violation. It is never thrown back at the
//!   caller; the violation is recorded and the producer loop surfaces it as
//!   a terminal [`FlowError::IllegalDemand`].
//! - `cancel` is idempotent and callable from any context. The producer
//!   loop observes it at its next suspension point (bounded delay; an
//!   already-dispatched delivery may still land once).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::demand::DemandController;
use crate::error::FlowError;

/// Shared state between the [`Subscription`] handle and the producer-side
/// emitter. The demand counter is the only state mutated from both sides;
/// everything else is set-once flags.
pub(crate) struct SubscriptionState {
    demand: DemandController,
    cancel: CancellationToken,
    /// Wakes the producer loop after `request`/`cancel`.
    wakeup: Notify,
    /// Set once by whichever side claims terminal delivery.
    terminated: AtomicBool,
    /// Pending protocol violation, surfaced by the producer loop.
    violation: Mutex<Option<FlowError>>,
}

impl SubscriptionState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            demand: DemandController::new(),
            cancel: CancellationToken::new(),
            wakeup: Notify::new(),
            terminated: AtomicBool::new(false),
            violation: Mutex::new(None),
        })
    }

    pub(crate) fn demand(&self) -> &DemandController {
        &self.demand
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Claims the right to deliver the single terminal signal.
    pub(crate) fn try_claim_terminal(&self) -> bool {
        self.terminated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
        self.wakeup.notify_one();
    }

    /// Suspends the producer loop until new demand, a cancel, or a
    /// violation arrives. May wake spuriously; callers re-check state.
    pub(crate) async fn producer_wait(&self) {
        tokio::select! {
            _ = self.wakeup.notified() => {}
            _ = self.cancel.cancelled() => {}
        }
    }

    /// Waits until the subscription is cancelled.
    pub(crate) async fn wait_cancelled(&self) {
        self.cancel.cancelled().await;
    }

    pub(crate) fn record_violation(&self, error: FlowError) {
        let mut slot = match self.violation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    pub(crate) fn take_violation(&self) -> Option<FlowError> {
        let mut slot = match self.violation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take()
    }

    pub(crate) fn has_violation(&self) -> bool {
        let slot = match self.violation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.is_some()
    }
}

/// Consumer-side handle for one publisher execution.
///
/// Cloneable (all clones drive the same subscription); cheap to pass
/// between contexts.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionState>,
}

impl Subscription {
    pub(crate) fn new(inner: Arc<SubscriptionState>) -> Self {
        Self { inner }
    }

    /// Grants `n` more units of demand.
    ///
    /// - `n = 0` is a protocol violation: the subscription terminates with
    ///   [`FlowError::IllegalDemand`] delivered via `on_error` (never
    ///   thrown from this call).
    /// - On an already-terminated or cancelled subscription this is a
    ///   no-op.
    pub fn request(&self, n: u64) {
        if self.inner.is_terminated() || self.inner.is_cancelled() {
            return;
        }
        if n == 0 {
            self.inner
                .record_violation(FlowError::IllegalDemand { requested: 0 });
        } else {
            self.inner.demand.add(n);
        }
        self.inner.wakeup.notify_one();
    }

    /// Grants unbounded demand (the counter saturates and is never
    /// decremented again).
    pub fn request_unbounded(&self) {
        if self.inner.is_terminated() || self.inner.is_cancelled() {
            return;
        }
        self.inner.demand.add(DemandController::UNBOUNDED);
        self.inner.wakeup.notify_one();
    }

    /// Cancels the subscription. Idempotent; a no-op after termination.
    ///
    /// The producer loop stops scheduling new deliveries once it observes
    /// the cancel; one already-dispatched delivery may still land.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// True once `cancel` was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// True once the terminal signal was claimed (complete or error).
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    /// Current outstanding demand.
    #[must_use]
    pub fn demand(&self) -> u64 {
        self.inner.demand.outstanding()
    }

    pub(crate) fn state(&self) -> &Arc<SubscriptionState> {
        &self.inner
    }
}
