use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::engine::aggregator::summarize;
use crate::engine::collector::outcome_channel;
use crate::engine::executor::{Executor, HttpExecutor};
use crate::engine::worker::run_worker;
use crate::error::VolleyError;
use crate::http::client::HttpClient;
use crate::results::RunResult;
use crate::run::model::RunRequest;
use crate::run::validation::normalize;

/// Execute one run end-to-end and block until its [`RunResult`] is ready.
///
/// `cancel` is the external stop request: cancelling it ends the run early
/// and the result is assembled from whatever was collected. The token is
/// owned by this run alone; concurrent runs never share state.
///
/// The only failure mode is invalid configuration, rejected before any
/// network activity. Per-request failures are absorbed into outcomes.
pub async fn execute_run(
    request: RunRequest,
    cancel: CancellationToken,
) -> Result<RunResult, VolleyError> {
    let request = normalize(request)?;
    let client = HttpClient::builder().build()?;
    let executor = HttpExecutor::new(client.inner().clone(), &request)?;
    Ok(run_with_executor(executor, &request, cancel).await)
}

/// Convenience wrapper for callers without an external stop signal.
///
/// With `max_duration` 0 the run has no deadline and this future only
/// resolves once the process-level caller drops it.
pub async fn run(request: RunRequest) -> Result<RunResult, VolleyError> {
    execute_run(request, CancellationToken::new()).await
}

/// Drive a normalized run over an arbitrary [`Executor`].
///
/// Spawns exactly `parallel` workers, waits for the run deadline or the
/// external stop, cancels, drains the in-flight calls (bounded by the
/// longest per-call deadline), and assembles the result.
pub async fn run_with_executor<E>(
    executor: E,
    request: &RunRequest,
    cancel: CancellationToken,
) -> RunResult
where
    E: Executor + 'static,
{
    let started_at = Utc::now();
    let run_deadline = (request.max_duration > 0)
        .then(|| Instant::now() + Duration::from_millis(request.max_duration));

    let executor = Arc::new(executor);
    let (collector, receiver) = outcome_channel();

    let mut workers: JoinSet<()> = JoinSet::new();
    for _ in 0..request.parallel.max(1) {
        let executor = Arc::clone(&executor);
        let collector = collector.clone();
        let cancel = cancel.clone();
        workers.spawn(async move {
            run_worker(executor, collector, cancel, run_deadline).await;
        });
    }
    // Workers hold the only remaining sender clones; the drain below ends
    // once the last worker exits.
    drop(collector);

    match run_deadline {
        Some(deadline) => {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = sleep_until(deadline) => {}
            }
        }
        None => cancel.cancelled().await,
    }
    cancel.cancel();
    tracing::debug!("run stopping, waiting for in-flight calls to finish");

    while workers.join_next().await.is_some() {}

    let results = receiver.drain().await;
    let summary = summarize(&results);
    let finished_at = Utc::now();
    tracing::info!(
        total = summary.total_requests,
        errors = summary.error_count,
        "run complete"
    );

    RunResult {
        run_id: Uuid::new_v4(),
        started_at,
        finished_at,
        results,
        summary,
    }
}
