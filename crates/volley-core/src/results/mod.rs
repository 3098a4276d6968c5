pub mod export;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status codes below this value count as success (2xx and 3xx).
pub const SUCCESS_STATUS_LIMIT: u16 = 400;

// ---------------------------------------------------------------------------
// RequestOutcome
// ---------------------------------------------------------------------------

/// The recorded result of one HTTP call attempt.
///
/// A call that received a response carries `status_code` and no `error`; a
/// call that failed or timed out carries `error` and no `status_code`. The
/// elapsed duration is recorded in both cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestOutcome {
    /// When the request was issued.
    pub time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Elapsed time for the call in milliseconds, measured up to the point
    /// of completion, failure, or deadline expiry.
    #[serde(rename = "duration")]
    pub duration_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestOutcome {
    /// Outcome for a call that received a response.
    pub fn success(time: DateTime<Utc>, status_code: u16, elapsed: Duration) -> Self {
        Self {
            time,
            status_code: Some(status_code),
            duration_ms: elapsed.as_millis() as u64,
            error: None,
        }
    }

    /// Outcome for a call that failed or timed out before a response.
    pub fn failure(time: DateTime<Utc>, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            time,
            status_code: None,
            duration_ms: elapsed.as_millis() as u64,
            error: Some(error.into()),
        }
    }

    /// Success predicate used by the aggregator: a present status code below
    /// [`SUCCESS_STATUS_LIMIT`] and no recorded error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && matches!(self.status_code, Some(code) if code < SUCCESS_STATUS_LIMIT)
    }
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Latency percentiles in milliseconds, nearest-rank over all outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencySummary {
    #[serde(rename = "p50")]
    pub p50_ms: u64,
    #[serde(rename = "p90")]
    pub p90_ms: u64,
    #[serde(rename = "p99")]
    pub p99_ms: u64,
}

/// Aggregated statistics over a finished run, computed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    /// Mean elapsed time in milliseconds across all outcomes, successes and
    /// failures alike. 0 when the run produced no outcomes.
    #[serde(rename = "avg_duration")]
    pub avg_duration_ms: f64,
    pub latency: LatencySummary,
}

// ---------------------------------------------------------------------------
// RunResult
// ---------------------------------------------------------------------------

/// Complete data for one finished run, assembled once by the controller and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Outcomes in completion order across all workers.
    pub results: Vec<RequestOutcome>,
    pub summary: RunSummary,
}
