//! Source adapters: one implementation per external bibliographic service.
//!
//! Every adapter implements [`SourceAdapter::fetch`], which may fail. Callers
//! only ever use [`SourceAdapter::search`], which bounds the call duration and
//! turns every failure into [`SourcePage::empty`].

mod arxiv;
mod core_ac;
mod crossref;
mod openalex;
mod pubmed;
mod semantic_scholar;

pub use self::arxiv::{ArxivSource, parse_atom_feed};
pub use self::core_ac::CoreSource;
pub use self::crossref::CrossrefSource;
pub use self::openalex::OpenAlexSource;
pub use self::pubmed::PubmedSource;
pub use self::semantic_scholar::SemanticScholarSource;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Deserializer};

use crate::client::HttpClient;
use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{SearchFilters, Source, SourcePage};

/// Capability shared by all source adapters.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which service this adapter talks to.
    fn source(&self) -> Source;

    /// Whether credentials the source needs are configured.
    fn has_credentials(&self) -> bool {
        true
    }

    /// Upper bound on one [`search`](Self::search) call.
    fn call_timeout(&self) -> Duration {
        api::ADAPTER_TIMEOUT
    }

    /// Run the protocol-specific exchange and map the response.
    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage>;

    /// Run [`fetch`](Self::fetch) within [`call_timeout`](Self::call_timeout).
    ///
    /// An expired budget becomes [`ClientError::Timeout`].
    async fn bounded_fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let timeout = self.call_timeout();
        tokio::time::timeout(timeout, self.fetch(query, limit, offset))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
    }

    /// Search the source. Never fails: errors, timeouts and missing
    /// credentials all produce an empty page.
    async fn search(&self, query: &str, limit: u32, offset: u32) -> SourcePage {
        let source = self.source();

        if source.requires_credentials() && !self.has_credentials() {
            tracing::debug!(source = %source, "Skipping source without credentials");
            return SourcePage::empty();
        }

        match self.bounded_fetch(query, limit, offset).await {
            Ok(page) => {
                tracing::debug!(
                    source = %source,
                    query,
                    count = page.papers.len(),
                    total = page.total,
                    "Source call succeeded"
                );
                page
            }
            Err(error) => {
                tracing::warn!(
                    source = %source,
                    query,
                    error = %error,
                    transient = error.is_retryable(),
                    "Source call failed"
                );
                SourcePage::empty()
            }
        }
    }
}

/// Immutable set of adapters keyed by source, iterated in dispatch order.
#[derive(Clone, Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<Source, Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every built-in adapter against one shared HTTP client.
    #[must_use]
    pub fn from_config(config: &Config, client: &HttpClient) -> Self {
        Self::new()
            .with_adapter(Arc::new(SemanticScholarSource::new(config, client.clone())))
            .with_adapter(Arc::new(ArxivSource::new(config, client.clone())))
            .with_adapter(Arc::new(CrossrefSource::new(config, client.clone())))
            .with_adapter(Arc::new(PubmedSource::new(config, client.clone())))
            .with_adapter(Arc::new(OpenAlexSource::new(config, client.clone())))
            .with_adapter(Arc::new(CoreSource::new(config, client.clone())))
    }

    /// Add an adapter, replacing any previous one for the same source.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(adapter.source(), adapter);
        self
    }

    /// Registered sources, in dispatch order.
    pub fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        self.adapters.keys().copied()
    }

    /// Adapters allowed by the filters, in dispatch order.
    #[must_use]
    pub fn enabled(&self, filters: &SearchFilters) -> Vec<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .filter(|(source, _)| filters.allows(**source))
            .map(|(_, adapter)| Arc::clone(adapter))
            .collect()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Check if no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.adapters.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `User-Agent` announcing a contact address, for polite-pool APIs.
pub(crate) fn polite_headers(contact_email: &str) -> ClientResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&format!(
            "paper-search/{} (mailto:{contact_email})",
            env!("CARGO_PKG_VERSION")
        ))?,
    );
    Ok(headers)
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drop empty strings that some APIs use instead of null.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Paper;

    struct Fixed {
        source: Source,
        outcome: fn() -> ClientResult<SourcePage>,
        credentials: bool,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl SourceAdapter for Fixed {
        fn source(&self) -> Source {
            self.source
        }

        fn has_credentials(&self) -> bool {
            self.credentials
        }

        fn call_timeout(&self) -> Duration {
            Duration::from_millis(50)
        }

        async fn fetch(&self, _query: &str, _limit: u32, _offset: u32) -> ClientResult<SourcePage> {
            tokio::time::sleep(self.delay).await;
            (self.outcome)()
        }
    }

    fn one_paper() -> ClientResult<SourcePage> {
        Ok(SourcePage::new(vec![Paper::new(Source::Arxiv, "1")], 1, 10, 0))
    }

    fn server_error() -> ClientResult<SourcePage> {
        Err(ClientError::server(503, "unavailable"))
    }

    fn adapter(source: Source, outcome: fn() -> ClientResult<SourcePage>) -> Fixed {
        Fixed { source, outcome, credentials: true, delay: Duration::ZERO }
    }

    #[tokio::test]
    async fn test_search_passes_success_through() {
        let page = adapter(Source::Arxiv, one_paper).search("q", 10, 0).await;
        assert_eq!(page.papers.len(), 1);
    }

    #[tokio::test]
    async fn test_search_degrades_errors_to_empty() {
        let page = adapter(Source::Arxiv, server_error).search("q", 10, 0).await;
        assert_eq!(page, SourcePage::empty());
    }

    #[tokio::test]
    async fn test_search_degrades_timeouts_to_empty() {
        let slow = Fixed { delay: Duration::from_secs(5), ..adapter(Source::Arxiv, one_paper) };
        let page = slow.search("q", 10, 0).await;
        assert!(page.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_bounded_fetch_reports_timeout() {
        let slow = Fixed { delay: Duration::from_secs(5), ..adapter(Source::Arxiv, one_paper) };
        let err = slow.bounded_fetch("q", 10, 0).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_millis(50)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_bounded_fetch_passes_errors_through() {
        let err = adapter(Source::Arxiv, server_error).bounded_fetch("q", 10, 0).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_search_skips_missing_credentials() {
        let locked = Fixed { credentials: false, ..adapter(Source::Core, one_paper) };
        assert!(locked.search("q", 10, 0).await.is_empty());
    }

    #[test]
    fn test_registry_enabled_respects_filters() {
        let registry = SourceRegistry::new()
            .with_adapter(Arc::new(adapter(Source::Core, one_paper)))
            .with_adapter(Arc::new(adapter(Source::Arxiv, one_paper)))
            .with_adapter(Arc::new(adapter(Source::SemanticScholar, one_paper)));

        let default: Vec<Source> =
            registry.enabled(&SearchFilters::none()).iter().map(|a| a.source()).collect();
        assert_eq!(default, vec![Source::SemanticScholar, Source::Arxiv]);

        let explicit: Vec<Source> = registry
            .enabled(&SearchFilters::none().sources([Source::Core]))
            .iter()
            .map(|a| a.source())
            .collect();
        assert_eq!(explicit, vec![Source::Core]);
    }

    #[test]
    fn test_registry_from_config_has_every_source() {
        let config = Config::default();
        let client = HttpClient::new(&config).unwrap();
        let registry = SourceRegistry::from_config(&config, &client);
        assert_eq!(registry.sources().collect::<Vec<_>>(), Source::ALL.to_vec());
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Debug, Default, Deserialize)]
        #[serde(default)]
        struct Listing {
            #[serde(deserialize_with = "null_as_default")]
            items: Vec<String>,
        }

        let listing: Listing = serde_json::from_str(r#"{"items": null}"#).unwrap();
        assert!(listing.items.is_empty());
        let listing: Listing = serde_json::from_str("{}").unwrap();
        assert!(listing.items.is_empty());
        let listing: Listing = serde_json::from_str(r#"{"items": ["a"]}"#).unwrap();
        assert_eq!(listing.items, vec!["a"]);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
