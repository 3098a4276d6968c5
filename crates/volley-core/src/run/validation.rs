use crate::error::VolleyError;
use crate::run::model::RunRequest;

/// Normalize a [`RunRequest`] before the run starts.
///
/// Applies defaults (`parallel` 0 becomes 1, endpoint whitespace trimmed)
/// and rejects configurations the engine must never attempt: an empty
/// endpoint, a non-http(s) scheme, or headers that cannot be resolved.
/// Any error here fails the whole run before a single worker starts.
pub fn normalize(mut request: RunRequest) -> Result<RunRequest, VolleyError> {
    let endpoint = request.endpoint.trim();
    if endpoint.is_empty() {
        return Err(VolleyError::Validation("endpoint is required".to_string()));
    }
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(VolleyError::Validation(format!(
            "endpoint must start with http:// or https:// (got: {endpoint})"
        )));
    }
    request.endpoint = endpoint.to_string();

    if request.parallel == 0 {
        request.parallel = 1;
    }

    // Surface malformed raw header blocks now rather than per request.
    request.resolved_headers()?;

    Ok(request)
}
