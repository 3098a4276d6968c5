use std::time::Duration;

use crate::error::VolleyError;

/// Wrapper around a reqwest Client with builder-pattern configuration and
/// connection-pool settings.
///
/// The client itself carries no timeout; per-call deadlines are enforced by
/// the request executor.
pub struct HttpClient {
    inner: reqwest::Client,
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: format!("volley/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.pool_max_idle_per_host = n;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, VolleyError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(HttpClient { inner: client })
    }
}

impl HttpClient {
    /// Returns a builder for customising the client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Access the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_produces_client() {
        assert!(HttpClientBuilder::default().build().is_ok());
    }

    #[test]
    fn customised_builder_produces_client() {
        let client = HttpClient::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(10))
            .user_agent("volley-test")
            .build();
        assert!(client.is_ok());
    }
}
