use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{timeout_at, Instant};

use crate::error::VolleyError;
use crate::results::RequestOutcome;
use crate::run::model::{Body, HttpMethod, RunRequest};

/// Error text recorded when a call exceeds its deadline. Kept distinct from
/// network error texts so timeouts are observable in results and tests.
pub const TIMEOUT_ERROR: &str = "request timed out";

/// Performs one call and reports its outcome.
///
/// Implementations must capture every failure mode in the outcome's `error`
/// field; `execute` never panics and never raises an error to the caller.
pub trait Executor: Send + Sync {
    fn execute(
        &self,
        run_deadline: Option<Instant>,
    ) -> impl Future<Output = RequestOutcome> + Send;
}

// ---------------------------------------------------------------------------
// HttpExecutor
// ---------------------------------------------------------------------------

/// The real [`Executor`]: one HTTP call per `execute`, no retries.
///
/// Holds the immutable request template and the shared per-run client. The
/// per-call deadline is `now + request_timeout` when a per-request timeout is
/// configured, otherwise the ambient run deadline; with neither, the call is
/// unbounded.
pub struct HttpExecutor {
    client: reqwest::Client,
    method: reqwest::Method,
    endpoint: String,
    headers: HashMap<String, String>,
    body: Option<Body>,
    request_timeout: Option<Duration>,
}

impl HttpExecutor {
    pub fn new(client: reqwest::Client, request: &RunRequest) -> Result<Self, VolleyError> {
        Ok(Self {
            client,
            method: to_method(&request.method),
            endpoint: request.endpoint.clone(),
            headers: request.resolved_headers()?,
            body: request.body.clone(),
            request_timeout: (request.request_timeout > 0)
                .then(|| Duration::from_millis(request.request_timeout)),
        })
    }

    /// Build and send one request, returning the response status or an error
    /// description.
    async fn send(&self) -> Result<u16, String> {
        let mut builder = self.client.request(self.method.clone(), &self.endpoint);

        for (key, value) in &self.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &self.body {
            builder = match body {
                Body::Json(value) => builder.json(value),
                Body::Raw(text) => builder.body(text.clone()),
            };
        }

        let response = builder.send().await.map_err(describe_error)?;
        let status = response.status().as_u16();

        // Drain the body so the pooled connection can be reused; its content
        // is not part of the outcome contract.
        let bytes = response.bytes().await.map_err(describe_error)?;
        tracing::debug!(status, size = bytes.len(), "request completed");

        Ok(status)
    }
}

impl Executor for HttpExecutor {
    fn execute(
        &self,
        run_deadline: Option<Instant>,
    ) -> impl Future<Output = RequestOutcome> + Send {
        async move {
            let issued = Utc::now();
            let start = Instant::now();

            let sent = match effective_deadline(self.request_timeout, run_deadline, start) {
                Some(deadline) => match timeout_at(deadline, self.send()).await {
                    Ok(result) => result,
                    Err(_) => Err(TIMEOUT_ERROR.to_string()),
                },
                None => self.send().await,
            };

            let elapsed = start.elapsed();
            match sent {
                Ok(status) => RequestOutcome::success(issued, status, elapsed),
                Err(error) => RequestOutcome::failure(issued, elapsed, error),
            }
        }
    }
}

/// Deadline for a single call: the per-request timeout wins when configured,
/// otherwise the ambient run deadline bounds the call.
fn effective_deadline(
    request_timeout: Option<Duration>,
    run_deadline: Option<Instant>,
    now: Instant,
) -> Option<Instant> {
    match request_timeout {
        Some(timeout) => Some(now + timeout),
        None => run_deadline,
    }
}

fn to_method(method: &HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

/// Map a reqwest failure to the error vocabulary recorded in outcomes.
///
/// Timeouts raised by the client itself share [`TIMEOUT_ERROR`] with
/// deadline expiry; DNS and refused-connection failures keep their concise
/// historical texts.
fn describe_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        return TIMEOUT_ERROR.to_string();
    }

    // Walk to the innermost source for the transport-level detail.
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(inner) = source {
        detail = inner.to_string();
        source = inner.source();
    }

    let lowered = detail.to_lowercase();
    if lowered.contains("dns") || lowered.contains("no such host") {
        "host not found".to_string()
    } else if lowered.contains("connection refused") {
        "connection refused".to_string()
    } else if err.is_connect() {
        format!("connection failed: {detail}")
    } else {
        format!("network error: {detail}")
    }
}
