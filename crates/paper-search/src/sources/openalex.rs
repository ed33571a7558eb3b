//! OpenAlex works API adapter.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use super::{SourceAdapter, non_empty, null_as_default, polite_headers};
use crate::client::{HttpClient, params};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{Paper, Source, SourcePage};

/// Prefixes OpenAlex puts in front of DOIs.
const DOI_PREFIXES: [&str; 2] = ["https://doi.org/", "http://doi.org/"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorksResponse {
    #[serde(deserialize_with = "null_as_default")]
    meta: Meta,
    #[serde(deserialize_with = "null_as_default")]
    results: Vec<Work>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Meta {
    count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Work {
    id: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    authorships: Vec<Authorship>,
    abstract_inverted_index: Option<BTreeMap<String, Vec<usize>>>,
    publication_year: Option<i32>,
    primary_location: Option<Location>,
    cited_by_count: Option<u64>,
    open_access: Option<OpenAccess>,
    #[serde(deserialize_with = "null_as_default")]
    concepts: Vec<Named>,
    doi: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Authorship {
    author: Option<Named>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    source: Option<Named>,
    landing_page_url: Option<String>,
    pdf_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenAccess {
    oa_url: Option<String>,
}

/// Searches the OpenAlex `/works` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAlexSource {
    client: HttpClient,
    base_url: String,
    contact_email: String,
    timeout: Duration,
}

impl OpenAlexSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self {
            client,
            base_url: config.urls.openalex.clone(),
            contact_email: config.contact_email.clone(),
            timeout: config.adapter_timeout,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for OpenAlexSource {
    fn source(&self) -> Source {
        Source::OpenAlex
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        // OpenAlex pages are 1-based and sized by `per_page`.
        let page = offset / limit.max(1) + 1;
        let query_params = params([
            ("search", query.to_string()),
            ("per_page", limit.to_string()),
            ("page", page.to_string()),
            ("sort", "relevance_score:desc".to_string()),
        ]);

        let response: WorksResponse = self
            .client
            .get_json(&self.base_url, &query_params, polite_headers(&self.contact_email)?)
            .await?;

        let total = response.meta.count.unwrap_or(0);
        let papers = response.results.into_iter().filter_map(map_work).collect();
        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

/// Rebuild abstract text from OpenAlex's word → positions index.
fn rebuild_abstract(index: &BTreeMap<String, Vec<usize>>) -> String {
    let mut positioned: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |p| (*p, word.as_str())))
        .collect();
    positioned.sort_unstable_by_key(|(position, _)| *position);
    positioned.into_iter().map(|(_, word)| word).collect::<Vec<_>>().join(" ")
}

fn strip_doi_scheme(doi: &str) -> &str {
    DOI_PREFIXES.iter().find_map(|prefix| doi.strip_prefix(prefix)).unwrap_or(doi)
}

fn map_work(work: Work) -> Option<Paper> {
    let id = non_empty(work.id)?;
    let native_id = id.rsplit('/').next().unwrap_or(id.as_str()).to_string();

    let abstract_text = work.abstract_inverted_index.as_ref().map(rebuild_abstract);
    let title = non_empty(work.title).or_else(|| non_empty(work.display_name));
    let location = work.primary_location.unwrap_or_default();

    let mut paper = Paper::new(Source::OpenAlex, native_id)
        .with_title(title.as_deref())
        .with_abstract(abstract_text.as_deref())
        .with_authors(
            work.authorships.into_iter().filter_map(|a| a.author.and_then(|n| n.display_name)),
        )
        .with_fields(work.concepts.into_iter().filter_map(|c| c.display_name));

    paper.year = work.publication_year.unwrap_or(0);
    paper.citation_count = work.cited_by_count.unwrap_or(0);
    paper.venue = location.source.and_then(|s| non_empty(s.display_name));
    paper.url = non_empty(location.landing_page_url).or_else(|| Some(id.clone()));
    paper.pdf_url =
        work.open_access.and_then(|oa| non_empty(oa.oa_url)).or_else(|| non_empty(location.pdf_url));
    paper.identifiers.doi =
        non_empty(work.doi).map(|doi| strip_doi_scheme(&doi).to_string()).filter(|d| !d.is_empty());

    Some(paper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_abstract() {
        let index = BTreeMap::from([
            ("learning".to_string(), vec![1, 4]),
            ("Deep".to_string(), vec![0]),
            ("is".to_string(), vec![2]),
            ("representation".to_string(), vec![3]),
        ]);
        assert_eq!(rebuild_abstract(&index), "Deep learning is representation learning");
    }

    #[test]
    fn test_strip_doi_scheme() {
        assert_eq!(strip_doi_scheme("https://doi.org/10.1/abc"), "10.1/abc");
        assert_eq!(strip_doi_scheme("10.1/abc"), "10.1/abc");
    }

    #[test]
    fn test_null_lists_do_not_fail_the_page() {
        let response: WorksResponse = serde_json::from_value(serde_json::json!({
            "meta": null,
            "results": [{
                "id": "https://openalex.org/W1",
                "title": "Sparse work",
                "authorships": null,
                "concepts": null
            }]
        }))
        .unwrap();

        assert!(response.meta.count.is_none());
        let paper = map_work(response.results.into_iter().next().unwrap()).unwrap();
        assert_eq!(paper.title, "Sparse work");
        assert!(paper.authors.is_empty());
        assert!(paper.fields.is_empty());
    }

    #[test]
    fn test_map_work() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "id": "https://openalex.org/W2741809807",
            "title": "The state of OA",
            "authorships": [{"author": {"display_name": "Heather Piwowar"}}, {"author": null}],
            "abstract_inverted_index": {"Open": [0], "access": [1]},
            "publication_year": 2018,
            "primary_location": {"source": null, "landing_page_url": "https://peerj.com/articles/4375"},
            "cited_by_count": 700,
            "open_access": {"oa_url": "https://peerj.com/articles/4375.pdf"},
            "concepts": [{"display_name": "Citation"}, {"display_name": "Open access"}],
            "doi": "https://doi.org/10.7717/peerj.4375"
        }))
        .unwrap();

        let paper = map_work(work).unwrap();
        assert_eq!(paper.id, "openalex-W2741809807");
        assert_eq!(paper.r#abstract, "Open access");
        assert_eq!(paper.authors, vec!["Heather Piwowar"]);
        assert_eq!(paper.year, 2018);
        assert_eq!(paper.venue, None);
        assert_eq!(paper.doi(), Some("10.7717/peerj.4375"));
        assert_eq!(paper.fields, vec!["Citation", "Open access"]);
        assert_eq!(paper.pdf_url.as_deref(), Some("https://peerj.com/articles/4375.pdf"));
    }

    #[test]
    fn test_missing_abstract_gets_placeholder() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "id": "https://openalex.org/W1",
            "display_name": "Fallback name",
            "abstract_inverted_index": null
        }))
        .unwrap();
        let paper = map_work(work).unwrap();
        assert_eq!(paper.title, "Fallback name");
        assert_eq!(paper.r#abstract, crate::models::NO_ABSTRACT);
        assert_eq!(paper.url.as_deref(), Some("https://openalex.org/W1"));
    }
}
