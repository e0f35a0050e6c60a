//! # Source constructors.
//!
//! Canned producers covering the common sequence shapes. All of them are
//! lazy (nothing happens before subscribe) and re-subscribable (each
//! subscribe call replays the recipe from the start).

use std::sync::Arc;
use std::time::Duration;

use crate::error::FlowError;
use crate::signal::Emitter;

use super::Publisher;

impl<T: Send + 'static> Publisher<T> {
    /// Completes immediately, without emitting a value. Completion is not
    /// demand-gated, so this terminates even under zero demand.
    pub fn empty() -> Self {
        Self::create(|emitter: Emitter<T>| {
            Box::pin(async move {
                emitter.complete().await;
            })
        })
    }

    /// Emits no signal at all until the consumer cancels.
    pub fn never() -> Self {
        Self::create(|emitter: Emitter<T>| {
            Box::pin(async move {
                emitter.interrupted().await;
                emitter.surface_violation().await;
            })
        })
    }

    /// Terminates every subscription with `error`, immediately and
    /// regardless of demand.
    pub fn fail(error: FlowError) -> Self {
        Self::create(move |emitter: Emitter<T>| {
            let error = error.clone();
            Box::pin(async move {
                emitter.error(error).await;
            })
        })
    }

    /// Invokes `factory` once per subscription and replays the publisher
    /// it returns. This is how call-time state (a current timestamp, a
    /// blocking fetch) gets re-evaluated on every subscribe.
    ///
    /// The inner execution reuses the outer subscription: its producer
    /// drives the same channel, so demand, cancellation, and protocol
    /// violations flow through one place.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Publisher<T> + Send + Sync + 'static,
    {
        let factory = Arc::new(factory);
        Self::create(move |emitter: Emitter<T>| {
            let factory = Arc::clone(&factory);
            Box::pin(async move {
                factory().drive(emitter).await;
            })
        })
    }
}

impl<T: Send + Sync + Clone + 'static> Publisher<T> {
    /// Emits exactly `value`, then completes.
    pub fn just(value: T) -> Self {
        Self::from_iter([value])
    }

    /// Emits the items of `items` in order, one per unit of demand, then
    /// completes. An empty input completes immediately.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let items: Arc<Vec<T>> = Arc::new(items.into_iter().collect());
        Self::create(move |emitter: Emitter<T>| {
            let items = Arc::clone(&items);
            Box::pin(async move {
                for value in items.iter().cloned() {
                    if emitter.next(value).await.is_err() {
                        return;
                    }
                }
                emitter.complete().await;
            })
        })
    }
}

impl Publisher<u64> {
    /// Emits `0..count`, spaced `period` apart, then completes.
    ///
    /// Each tick is demand-gated after its delay elapses: under
    /// insufficient demand the ticker holds the value until demand
    /// arrives instead of erroring or dropping it. Cancellation is
    /// observed between ticks.
    pub fn ticker(period: Duration, count: u64) -> Self {
        Self::create(move |emitter: Emitter<u64>| {
            Box::pin(async move {
                for tick in 0..count {
                    tokio::select! {
                        _ = emitter.interrupted() => {
                            emitter.surface_violation().await;
                            return;
                        }
                        _ = tokio::time::sleep(period) => {}
                    }
                    if emitter.next(tick).await.is_err() {
                        return;
                    }
                }
                emitter.complete().await;
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::TestSubscriber;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_empty_completes_under_zero_demand() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::<u64>::empty().subscribe(consumer.clone()).await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.next_count(), 0);
        assert!(consumer.is_completed());
    }

    #[tokio::test]
    async fn test_just_emits_single_value() {
        let consumer = TestSubscriber::<String>::unbounded();
        Publisher::just("solo".to_string())
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.values(), vec!["solo".to_string()]);
        assert!(consumer.is_completed());
    }

    #[tokio::test]
    async fn test_from_iter_delivers_stepwise_per_request() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::from_iter(vec![10u64, 20, 30])
            .subscribe(consumer.clone())
            .await;

        for step in 1..=3u64 {
            consumer.request(1);
            timeout(WAIT, consumer.await_next_count(step as usize))
                .await
                .unwrap();
            assert_eq!(consumer.next_count(), step as usize);
        }

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.values(), vec![10, 20, 30]);
        assert!(consumer.is_completed());
    }

    #[tokio::test]
    async fn test_from_iter_empty_completes_immediately() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::from_iter(Vec::<u64>::new())
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.next_count(), 0);
        assert!(consumer.is_completed());
    }

    #[tokio::test]
    async fn test_fail_errors_under_zero_demand() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::<u64>::fail(FlowError::producer("boom"))
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.error(), Some(FlowError::producer("boom")));
        assert_eq!(consumer.next_count(), 0);
    }

    #[tokio::test]
    async fn test_defer_invokes_factory_per_subscription() {
        let calls = Arc::new(AtomicU32::new(0));
        let probe = Arc::clone(&calls);
        let publisher = Publisher::defer(move || {
            let call = probe.fetch_add(1, Ordering::SeqCst) + 1;
            Publisher::just(u64::from(call))
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = TestSubscriber::<u64>::unbounded();
        publisher.subscribe(first.clone()).await;
        timeout(WAIT, first.await_terminal()).await.unwrap();

        let second = TestSubscriber::<u64>::unbounded();
        publisher.subscribe(second.clone()).await;
        timeout(WAIT, second.await_terminal()).await.unwrap();

        assert_eq!(first.values(), vec![1]);
        assert_eq!(second.values(), vec![2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_defer_delivers_stepwise_per_request() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::defer(|| Publisher::from_iter(vec![7u64, 8, 9]))
            .subscribe(consumer.clone())
            .await;

        // Let the inner execution park waiting for demand before the
        // first request arrives.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(consumer.next_count(), 0);

        for step in 1..=3usize {
            consumer.request(1);
            timeout(WAIT, consumer.await_next_count(step)).await.unwrap();
            assert_eq!(consumer.next_count(), step);
        }

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.values(), vec![7, 8, 9]);
        assert!(consumer.is_completed());
    }

    #[tokio::test]
    async fn test_defer_surfaces_illegal_demand_while_idle() {
        let consumer = TestSubscriber::<u64>::with_demand(0);
        Publisher::defer(|| Publisher::<u64>::never())
            .subscribe(consumer.clone())
            .await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        consumer.request(0);

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(
            consumer.error(),
            Some(FlowError::IllegalDemand { requested: 0 })
        );
        assert_eq!(consumer.next_count(), 0);
    }

    #[tokio::test]
    async fn test_defer_forwards_error() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let publisher =
            Publisher::defer(|| Publisher::<u64>::fail(FlowError::producer("deferred boom")));
        publisher.subscribe(consumer.clone()).await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(
            consumer.error(),
            Some(FlowError::producer("deferred boom"))
        );
    }

    #[tokio::test]
    async fn test_never_emits_nothing_until_cancel() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let subscription = Publisher::<u64>::never().subscribe(consumer.clone()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(consumer.next_count(), 0);
        assert!(!consumer.is_terminated());

        subscription.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_terminated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_emits_count_then_completes() {
        let consumer = TestSubscriber::<u64>::unbounded();
        Publisher::ticker(Duration::from_millis(100), 3)
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_terminal()).await.unwrap();
        assert_eq!(consumer.values(), vec![0, 1, 2]);
        assert!(consumer.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_holds_tick_until_demand_arrives() {
        let consumer = TestSubscriber::<u64>::with_demand(2);
        Publisher::ticker(Duration::from_millis(100), 10)
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_next_count(2)).await.unwrap();
        // The third tick's delay elapses, but its delivery waits.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(consumer.values(), vec![0, 1]);
        assert!(!consumer.is_terminated());

        consumer.request(1);
        timeout(WAIT, consumer.await_next_count(3)).await.unwrap();
        assert_eq!(consumer.values(), vec![0, 1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_cancels_between_ticks() {
        let consumer = TestSubscriber::<u64>::unbounded();
        let subscription = Publisher::ticker(Duration::from_millis(100), u64::MAX)
            .subscribe(consumer.clone())
            .await;

        timeout(WAIT, consumer.await_next_count(3)).await.unwrap();
        subscription.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let settled = consumer.next_count();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(consumer.next_count(), settled);
        assert!(!consumer.is_terminated());
    }
}
