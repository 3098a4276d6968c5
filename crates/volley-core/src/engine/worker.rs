use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::engine::collector::ResultCollector;
use crate::engine::executor::Executor;

/// Run a single worker: issue calls back-to-back through `executor` and
/// submit each outcome to the collector until `cancel` is observed.
///
/// Cancellation is checked at the top of each iteration, so a worker never
/// starts a new call after the token fires and never interrupts a call
/// already in flight — an in-flight call is bounded only by its own
/// deadline.
pub async fn run_worker<E: Executor>(
    executor: Arc<E>,
    collector: ResultCollector,
    cancel: CancellationToken,
    run_deadline: Option<Instant>,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let outcome = executor.execute(run_deadline).await;
        collector.submit(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::collector::outcome_channel;
    use crate::results::RequestOutcome;
    use chrono::Utc;
    use std::future::Future;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Succeeds instantly; cancels the provided token after a fixed number
    /// of calls.
    struct StopAfter {
        limit: u64,
        calls: AtomicU64,
        cancel: CancellationToken,
    }

    impl Executor for StopAfter {
        fn execute(
            &self,
            _run_deadline: Option<Instant>,
        ) -> impl Future<Output = RequestOutcome> + Send {
            async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= self.limit {
                    self.cancel.cancel();
                }
                RequestOutcome::success(Utc::now(), 200, Duration::from_millis(n))
            }
        }
    }

    #[tokio::test]
    async fn worker_stops_without_executing_when_pre_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let executor = Arc::new(StopAfter {
            limit: u64::MAX,
            calls: AtomicU64::new(0),
            cancel: cancel.clone(),
        });
        let (collector, receiver) = outcome_channel();

        run_worker(Arc::clone(&executor), collector, cancel, None).await;

        assert!(receiver.drain().await.is_empty());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn worker_submits_every_outcome_until_cancelled() {
        let cancel = CancellationToken::new();
        let executor = Arc::new(StopAfter {
            limit: 3,
            calls: AtomicU64::new(0),
            cancel: cancel.clone(),
        });
        let (collector, receiver) = outcome_channel();

        run_worker(Arc::clone(&executor), collector, cancel, None).await;

        let outcomes = receiver.drain().await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
    }
}
