//! Client entry point.

use crate::activities::Activities;
use crate::config::Config;
use crate::error::Result;
use crate::http::HttpClient;
use crate::sessions::Sessions;
use crate::sources::Sources;
use std::time::Duration;

/// Client for the Jules API.
///
/// ```no_run
/// # async fn demo() -> jules::Result<()> {
/// let client = jules::Client::new("api-key");
/// let _page = client.sources().list(&Default::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Client {
    /// Client against the production endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(api_key),
        }
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Self::new(config.api_key()?)
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout());
        Ok(client)
    }

    /// Override the base URL, including the API version path.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.http
            .set_base_url(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Per-request timeout; zero means none. Also applies to an injected
    /// HTTP client.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http.set_timeout(timeout);
        self
    }

    /// Use a caller-supplied `reqwest::Client` (proxies, TLS roots, pooling).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http.set_client(client);
        self
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout()
    }

    pub fn sessions(&self) -> Sessions<'_> {
        Sessions::new(&self.http)
    }

    pub fn activities(&self) -> Activities<'_> {
        Activities::new(&self.http)
    }

    pub fn sources(&self) -> Sources<'_> {
        Sources::new(&self.http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_defaults() {
        let client = Client::new("k");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = Client::new("k").with_base_url("http://localhost:8080/v1alpha/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1alpha");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            api_key: Some("from-config".into()),
            base_url: "http://localhost:9/v1".into(),
            timeout_secs: 7,
            ..Config::default()
        };
        let client = Client::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/v1");
        assert_eq!(client.timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_from_config_requires_key() {
        let err = Client::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_injected_http_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1alpha/sources"))
            .and(header("x-goog-api-key", "k"))
            .and(header("x-injected", "yes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut defaults = reqwest::header::HeaderMap::new();
        defaults.insert("x-injected", reqwest::header::HeaderValue::from_static("yes"));
        let http = reqwest::Client::builder()
            .default_headers(defaults)
            .build()
            .unwrap();

        let client = Client::new("k")
            .with_base_url(format!("{}/v1alpha", server.uri()))
            .with_http_client(http);
        client.sources().list(&Default::default()).await.unwrap();
    }
}
