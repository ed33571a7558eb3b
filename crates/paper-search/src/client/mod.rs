//! Shared HTTP client for all source adapters.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Bounded retry middleware for transient failures
//! - Response caching for GET requests
//! - Uniform mapping of HTTP status codes to `ClientError`

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};

/// Query parameters as sent on the wire.
pub type Params = Vec<(String, String)>;

/// Pooled HTTP client shared by every adapter.
#[derive(Clone)]
pub struct HttpClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache (GET only).
    cache: Cache<String, serde_json::Value>,

    /// Transient retries configured on the middleware.
    max_retries: u32,
}

impl HttpClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("paper-search/{}", env!("CARGO_PKG_VERSION")))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(250), Duration::from_secs(2))
            .build_with_max_retries(config.max_transient_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self { client, cache, max_retries: config.max_transient_retries })
    }

    /// GET a JSON document.
    pub async fn get_json<T>(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: HeaderMap,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let cache_key = self.cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let response = self.client.get(url).query(params).headers(headers).send().await?;
        let response = self.handle_response(response).await?;
        let bytes = response.bytes().await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;

        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// GET a text document (e.g. an Atom feed).
    pub async fn get_text(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: HeaderMap,
    ) -> ClientResult<String> {
        let cache_key = self.cache_key("GET", url, params);
        if let Some(serde_json::Value::String(cached)) = self.cache.get(&cache_key).await {
            return Ok(cached);
        }

        let response = self.client.get(url).query(params).headers(headers).send().await?;
        let response = self.handle_response(response).await?;
        let text = response.text().await?;

        self.cache.insert(cache_key, serde_json::Value::String(text.clone())).await;

        Ok(text)
    }

    /// POST a JSON body and read a JSON document back. Never cached.
    pub async fn post_json<T>(
        &self,
        url: &str,
        params: &[(String, String)],
        headers: HeaderMap,
        body: &serde_json::Value,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let body_str = serde_json::to_string(body)?;

        let response = self
            .client
            .post(url)
            .query(params)
            .headers(headers)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            401 | 403 => Err(ClientError::Unauthorized { status: status.as_u16() }),
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Build a parameter list from borrowed pairs.
#[must_use]
pub fn params<const N: usize>(pairs: [(&str, String); N]) -> Params {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_retries", &self.max_retries)
            .field("cached_entries", &self.cache.entry_count())
            .finish()
    }
}
