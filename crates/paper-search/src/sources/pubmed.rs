//! PubMed adapter over the NCBI E-utilities (esearch, then esummary).

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Deserialize;

use super::{SourceAdapter, non_empty, null_as_default};
use crate::client::{HttpClient, params};
use crate::config::{Config, endpoints, vocabulary};
use crate::error::ClientResult;
use crate::models::{PUBMED_ABSTRACT, Paper, Source, SourcePage};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EsearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    esearchresult: EsearchResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EsearchResult {
    count: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    idlist: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EsummaryResponse {
    #[serde(deserialize_with = "null_as_default")]
    result: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Summary {
    title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    authors: Vec<SummaryAuthor>,
    pubdate: Option<String>,
    source: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    articleids: Vec<ArticleId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryAuthor {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArticleId {
    #[serde(deserialize_with = "null_as_default")]
    idtype: String,
    #[serde(deserialize_with = "null_as_default")]
    value: String,
}

/// Two-phase search against PubMed.
#[derive(Debug, Clone)]
pub struct PubmedSource {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl PubmedSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self { client, base_url: config.urls.pubmed.clone(), timeout: config.adapter_timeout }
    }

    async fn search_ids(&self, term: &str, limit: u32, offset: u32) -> ClientResult<EsearchResult> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let query_params = params([
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retmax", limit.to_string()),
            ("retstart", offset.to_string()),
            ("retmode", "json".to_string()),
        ]);

        let response: EsearchResponse =
            self.client.get_json(&url, &query_params, HeaderMap::new()).await?;
        Ok(response.esearchresult)
    }

    async fn summaries(&self, pmids: &[String]) -> ClientResult<HashMap<String, serde_json::Value>> {
        let url = format!("{}/esummary.fcgi", self.base_url);
        let query_params = params([
            ("db", "pubmed".to_string()),
            ("id", pmids.join(",")),
            ("retmode", "json".to_string()),
        ]);

        let response: EsummaryResponse =
            self.client.get_json(&url, &query_params, HeaderMap::new()).await?;
        Ok(response.result)
    }
}

#[async_trait::async_trait]
impl SourceAdapter for PubmedSource {
    fn source(&self) -> Source {
        Source::Pubmed
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let term = enhance_query(query);
        let found = self.search_ids(&term, limit, offset).await?;
        let total = found.count.as_deref().and_then(|c| c.trim().parse().ok()).unwrap_or(0);

        if found.idlist.is_empty() {
            return Ok(SourcePage::new(Vec::new(), total, limit, offset));
        }

        let mut summaries = self.summaries(&found.idlist).await?;

        // Keep esearch's relevance order; ids without a usable summary are skipped.
        let papers = found
            .idlist
            .iter()
            .filter_map(|pmid| {
                let raw = summaries.remove(pmid)?;
                match serde_json::from_value::<Summary>(raw) {
                    Ok(summary) => Some(map_summary(pmid, summary)),
                    Err(error) => {
                        tracing::debug!(pmid = %pmid, error = %error, "Skipping malformed summary");
                        None
                    }
                }
            })
            .collect();

        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

/// OR MeSH-style synonyms into the query for every medical term it mentions.
fn enhance_query(query: &str) -> String {
    let lower = query.to_lowercase();
    let mut enhanced = query.to_string();
    for (term, synonyms) in vocabulary::MESH_TERMS {
        if lower.contains(term) {
            enhanced.push_str(" OR ");
            enhanced.push_str(&synonyms.join(" OR "));
        }
    }
    enhanced
}

fn map_summary(pmid: &str, summary: Summary) -> Paper {
    let mut paper = Paper::new(Source::Pubmed, pmid)
        .with_title(summary.title.as_deref())
        .with_authors(summary.authors.into_iter().filter_map(|a| a.name));

    paper.r#abstract = PUBMED_ABSTRACT.to_string();
    paper.year = summary
        .pubdate
        .as_deref()
        .and_then(|d| d.split_whitespace().next())
        .and_then(|y| y.parse().ok())
        .unwrap_or(0);
    paper.venue = non_empty(summary.source);
    paper.url = Some(format!("{}/{pmid}/", endpoints::PUBMED_ARTICLE));
    paper.identifiers.pmid = Some(pmid.to_string());
    paper.identifiers.doi = summary
        .articleids
        .into_iter()
        .find(|id| id.idtype.eq_ignore_ascii_case("doi"))
        .and_then(|id| non_empty(Some(id.value)));

    paper
}
