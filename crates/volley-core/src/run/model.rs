use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::VolleyError;

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = VolleyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(VolleyError::Validation(format!(
                "invalid value for method: {s}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Extra request headers, either structured or as an opaque text block.
///
/// The opaque form holds newline-separated `Name: Value` lines and is
/// resolved at normalization; a line without a colon is a configuration
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Headers {
    Map(HashMap<String, String>),
    Raw(String),
}

impl Headers {
    /// Resolve into a name → value map.
    pub fn resolve(&self) -> Result<HashMap<String, String>, VolleyError> {
        match self {
            Headers::Map(map) => Ok(map.clone()),
            Headers::Raw(text) => parse_header_lines(text),
        }
    }
}

fn parse_header_lines(text: &str) -> Result<HashMap<String, String>, VolleyError> {
    let mut headers = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            VolleyError::Validation(format!("malformed header line: {line}"))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(VolleyError::Validation(format!(
                "malformed header line: {line}"
            )));
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Optional request payload.
///
/// A JSON string value is always treated as an opaque raw body; any other
/// JSON value is sent as JSON with the matching content type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Body {
    Raw(String),
    Json(serde_json::Value),
}

// ---------------------------------------------------------------------------
// RunRequest
// ---------------------------------------------------------------------------

/// Immutable configuration for one load generation run.
///
/// Deserialized from the inbound boundary payload; read-only once the run
/// has started.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunRequest {
    #[serde(default)]
    pub method: HttpMethod,

    /// Target URL; must be non-empty and carry an http(s) scheme.
    pub endpoint: String,

    /// Number of concurrent workers; 0 is normalized to 1.
    #[serde(default = "default_parallel")]
    pub parallel: u32,

    /// Per-request deadline in milliseconds. 0 means no per-request deadline;
    /// the call is then bounded only by the run deadline, if any.
    #[serde(default)]
    pub request_timeout: u64,

    /// Total wall-clock budget in milliseconds for issuing new requests.
    /// 0 means unbounded; the run proceeds until externally canceled.
    #[serde(default)]
    pub max_duration: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

fn default_parallel() -> u32 {
    1
}

impl RunRequest {
    /// Resolve the configured headers into a plain map, applying the raw
    /// `Name: Value` line parsing when needed.
    pub fn resolved_headers(&self) -> Result<HashMap<String, String>, VolleyError> {
        match &self.headers {
            None => Ok(HashMap::new()),
            Some(headers) => headers.resolve(),
        }
    }
}
