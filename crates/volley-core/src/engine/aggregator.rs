use crate::results::{LatencySummary, RequestOutcome, RunSummary};

/// Reduce a finished outcome sequence into a [`RunSummary`].
///
/// Pure function: no hidden state, identical input yields an identical
/// summary. Every outcome contributes its measured duration to the mean and
/// the percentiles, failures included. An empty sequence yields an all-zero
/// summary.
pub fn summarize(outcomes: &[RequestOutcome]) -> RunSummary {
    let total = outcomes.len() as u64;
    let success = outcomes.iter().filter(|o| o.is_success()).count() as u64;

    let mut durations: Vec<u64> = outcomes.iter().map(|o| o.duration_ms).collect();
    durations.sort_unstable();

    let avg = if total > 0 {
        durations.iter().sum::<u64>() as f64 / total as f64
    } else {
        0.0
    };

    RunSummary {
        total_requests: total,
        success_count: success,
        error_count: total - success,
        avg_duration_ms: avg,
        latency: LatencySummary {
            p50_ms: percentile(&durations, 50.0),
            p90_ms: percentile(&durations, 90.0),
            p99_ms: percentile(&durations, 99.0),
        },
    }
}

/// Nearest-rank percentile over an ascending-sorted sample.
///
/// Selects the value at rank `ceil(p/100 * n) - 1`, clamped to `[0, n-1]`.
/// Returns 0 for an empty sample.
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}
