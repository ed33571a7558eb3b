//! CORE v3 search adapter. Requires an API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::{SourceAdapter, non_empty, null_as_default};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{Paper, Source, SourcePage};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchResponse {
    total_hits: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    results: Vec<Work>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Work {
    /// Numeric in v3, but older payloads used strings.
    id: serde_json::Value,
    title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    authors: Vec<Author>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    description: Option<String>,
    year_published: Option<i32>,
    #[serde(deserialize_with = "null_as_default")]
    journals: Vec<Journal>,
    publisher: Option<String>,
    download_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    source_fulltext_urls: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    subjects: Vec<String>,
    field_of_study: Option<String>,
    citation_count: Option<u64>,
    doi: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Author {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Journal {
    title: Option<String>,
}

/// Searches CORE's open-access works index.
#[derive(Debug, Clone)]
pub struct CoreSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl CoreSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self {
            client,
            base_url: config.urls.core.clone(),
            api_key: config.core_api_key.clone(),
            timeout: config.adapter_timeout,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CoreSource {
    fn source(&self) -> Source {
        Source::Core
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::missing_credentials(Source::Core.display_name()))?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);

        let body = json!({
            "q": query,
            "limit": limit,
            "offset": offset,
            "sort": "relevance",
        });

        let response: SearchResponse =
            self.client.post_json(&self.base_url, &[], headers, &body).await?;

        let total = response.total_hits.unwrap_or(0);
        let papers = response.results.into_iter().filter_map(map_work).collect();
        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

fn id_string(id: &serde_json::Value) -> Option<String> {
    match id {
        serde_json::Value::String(s) => non_empty(Some(s.clone())),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn map_work(work: Work) -> Option<Paper> {
    let id = id_string(&work.id)?;

    let abstract_text = non_empty(work.abstract_text).or_else(|| non_empty(work.description));
    let venue = work
        .journals
        .into_iter()
        .find_map(|j| non_empty(j.title))
        .or_else(|| non_empty(work.publisher));
    let download_url = non_empty(work.download_url);
    let fields = work.subjects.into_iter().chain(work.field_of_study);

    let mut paper = Paper::new(Source::Core, id)
        .with_title(work.title.as_deref())
        .with_abstract(abstract_text.as_deref())
        .with_authors(work.authors.into_iter().filter_map(|a| a.name))
        .with_fields(fields);

    paper.year = work.year_published.unwrap_or(0);
    paper.venue = venue;
    paper.citation_count = work.citation_count.unwrap_or(0);
    paper.url = download_url
        .clone()
        .or_else(|| work.source_fulltext_urls.into_iter().find_map(|u| non_empty(Some(u))));
    paper.pdf_url = download_url;
    paper.identifiers.doi = non_empty(work.doi);

    Some(paper)
}
