//! Semantic Scholar Graph API adapter.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use super::{SourceAdapter, non_empty, null_as_default};
use crate::client::{HttpClient, params};
use crate::config::{Config, endpoints};
use crate::error::ClientResult;
use crate::models::{Paper, Source, SourcePage, collapse_whitespace};

/// Fields requested for every search hit.
const FIELDS: &str =
    "paperId,title,abstract,year,venue,citationCount,url,openAccessPdf,fieldsOfStudy,externalIds,authors";

/// Largest page the search endpoint accepts.
const MAX_LIMIT: u32 = 100;

/// Venue reported when the record has none.
const UNKNOWN_VENUE: &str = "Unknown Venue";

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid non-word pattern"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    data: Option<Vec<ApiPaper>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiPaper {
    paper_id: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    year: Option<i32>,
    venue: Option<String>,
    citation_count: Option<u64>,
    url: Option<String>,
    open_access_pdf: Option<OpenAccessPdf>,
    fields_of_study: Option<Vec<Option<String>>>,
    external_ids: Option<ExternalIds>,
    #[serde(deserialize_with = "null_as_default")]
    authors: Vec<ApiAuthor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenAccessPdf {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(rename = "ArXiv")]
    arxiv: Option<String>,
    #[serde(rename = "PubMed")]
    pubmed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiAuthor {
    name: Option<String>,
}

/// Searches `/paper/search` on the Graph API.
#[derive(Debug, Clone)]
pub struct SemanticScholarSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SemanticScholarSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self {
            client,
            base_url: config.urls.semantic_scholar.clone(),
            api_key: config.semantic_scholar_api_key.clone(),
            timeout: config.adapter_timeout,
        }
    }

    fn headers(&self) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(key)?);
        }
        Ok(headers)
    }

    async fn request(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let limit = limit.min(MAX_LIMIT);
        let url = format!("{}/paper/search", self.base_url);
        let query_params = params([
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("fields", FIELDS.to_string()),
        ]);

        let response: SearchResponse =
            self.client.get_json(&url, &query_params, self.headers()?).await?;

        let papers: Vec<Paper> =
            response.data.unwrap_or_default().into_iter().filter_map(map_paper).collect();
        let total = response.total.unwrap_or(papers.len() as u64);
        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

#[async_trait::async_trait]
impl SourceAdapter for SemanticScholarSource {
    fn source(&self) -> Source {
        Source::SemanticScholar
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        match self.request(query, limit, offset).await {
            Err(err) if err.is_malformed_query() => {
                let simplified = simplify_query(query);
                if simplified.is_empty() || simplified == query {
                    return Err(err);
                }
                tracing::debug!(query, simplified = %simplified, "Retrying with simplified query");
                self.request(&simplified, limit, offset).await
            }
            other => other,
        }
    }
}

/// Replace characters the search endpoint rejects with spaces.
fn simplify_query(query: &str) -> String {
    collapse_whitespace(&NON_WORD.replace_all(query, " "))
}

fn map_paper(raw: ApiPaper) -> Option<Paper> {
    let paper_id = non_empty(raw.paper_id)?;
    let external = raw.external_ids.unwrap_or_default();

    let mut paper = Paper::new(Source::SemanticScholar, &paper_id)
        .with_title(raw.title.as_deref())
        .with_abstract(raw.abstract_text.as_deref())
        .with_authors(raw.authors.into_iter().filter_map(|a| a.name))
        .with_fields(raw.fields_of_study.unwrap_or_default().into_iter().flatten());

    paper.year = raw.year.unwrap_or(0);
    paper.citation_count = raw.citation_count.unwrap_or(0);
    paper.venue = Some(non_empty(raw.venue).unwrap_or_else(|| UNKNOWN_VENUE.to_string()));
    paper.url = Some(
        non_empty(raw.url)
            .unwrap_or_else(|| format!("{}/{paper_id}", endpoints::SEMANTIC_SCHOLAR_PAPER)),
    );
    paper.pdf_url = raw.open_access_pdf.and_then(|pdf| non_empty(pdf.url));
    paper.identifiers.doi = non_empty(external.doi);
    paper.identifiers.arxiv_id = non_empty(external.arxiv);
    paper.identifiers.pmid = non_empty(external.pubmed);

    Some(paper)
}
