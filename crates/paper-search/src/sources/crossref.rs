//! Crossref works API adapter.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use super::{SourceAdapter, non_empty, null_as_default, polite_headers};
use crate::client::{HttpClient, params};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{Paper, Source, SourcePage};

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid markup pattern"));

#[derive(Debug, Deserialize)]
struct WorksResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    message: WorksMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorksMessage {
    #[serde(rename = "total-results")]
    total_results: Option<u64>,
    #[serde(deserialize_with = "null_as_default")]
    items: Vec<Work>,
}

/// Crossref returns some scalar fields as single-element arrays.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn first(&self) -> Option<&str> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first().map(String::as_str),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Work {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    title: Option<OneOrMany>,
    #[serde(deserialize_with = "null_as_default")]
    author: Vec<Contributor>,
    #[serde(rename = "abstract")]
    abstract_text: Option<OneOrMany>,
    published: Option<DateParts>,
    created: Option<DateParts>,
    #[serde(rename = "container-title")]
    container_title: Option<OneOrMany>,
    publisher: Option<String>,
    #[serde(rename = "is-referenced-by-count")]
    referenced_by_count: Option<u64>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    subject: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Contributor {
    given: Option<String>,
    family: Option<String>,
    name: Option<String>,
}

impl Contributor {
    fn display_name(self) -> Option<String> {
        let joined = format!(
            "{} {}",
            self.given.unwrap_or_default(),
            self.family.unwrap_or_default()
        );
        non_empty(Some(joined)).or_else(|| non_empty(self.name))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DateParts {
    #[serde(rename = "date-parts", deserialize_with = "null_as_default")]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten().filter(|y| *y > 0)
    }
}

/// Searches the Crossref `/works` endpoint through the polite pool.
#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: HttpClient,
    base_url: String,
    contact_email: String,
    timeout: Duration,
}

impl CrossrefSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self {
            client,
            base_url: config.urls.crossref.clone(),
            contact_email: config.contact_email.clone(),
            timeout: config.adapter_timeout,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CrossrefSource {
    fn source(&self) -> Source {
        Source::Crossref
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let query_params = params([
            ("query", query.to_string()),
            ("rows", limit.to_string()),
            ("offset", offset.to_string()),
            ("sort", "relevance".to_string()),
            ("order", "desc".to_string()),
        ]);

        let response: WorksResponse = self
            .client
            .get_json(&self.base_url, &query_params, polite_headers(&self.contact_email)?)
            .await?;

        let total = response.message.total_results.unwrap_or(0);
        let papers = response.message.items.into_iter().filter_map(map_work).collect();
        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

/// Remove JATS markup such as `<jats:p>` from an abstract.
fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, " ").into_owned()
}

fn map_work(work: Work) -> Option<Paper> {
    let doi = non_empty(work.doi)?;

    let abstract_text = work.abstract_text.as_ref().and_then(OneOrMany::first).map(strip_markup);
    let year = work
        .published
        .as_ref()
        .and_then(DateParts::year)
        .or_else(|| work.created.as_ref().and_then(DateParts::year))
        .unwrap_or(0);
    let venue = work
        .container_title
        .as_ref()
        .and_then(OneOrMany::first)
        .map(str::to_string)
        .and_then(|v| non_empty(Some(v)))
        .or_else(|| non_empty(work.publisher));

    let mut paper = Paper::new(Source::Crossref, &doi)
        .with_title(work.title.as_ref().and_then(OneOrMany::first))
        .with_abstract(abstract_text.as_deref())
        .with_authors(work.author.into_iter().filter_map(Contributor::display_name))
        .with_fields(&work.subject);

    paper.year = year;
    paper.venue = venue;
    paper.citation_count = work.referenced_by_count.unwrap_or(0);
    paper.url = non_empty(work.url);
    paper.identifiers.doi = Some(doi);

    Some(paper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        let raw = "<jats:p>CRISPR <jats:italic>Cas9</jats:italic> editing.</jats:p>";
        let paper = Paper::new(Source::Crossref, "x").with_abstract(Some(&strip_markup(raw)));
        assert_eq!(paper.r#abstract, "CRISPR Cas9 editing.");
    }

    #[test]
    fn test_map_work() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "DOI": "10.1038/nature14539",
            "title": ["Deep learning"],
            "author": [
                {"given": "Yann", "family": "LeCun"},
                {"name": "The Consortium"},
                {"given": "", "family": ""}
            ],
            "abstract": "<jats:p>Deep learning allows models.</jats:p>",
            "published": {"date-parts": [[2015, 5, 27]]},
            "container-title": ["Nature"],
            "is-referenced-by-count": 50000,
            "URL": "https://doi.org/10.1038/nature14539",
            "subject": ["Multidisciplinary"]
        }))
        .unwrap();

        let paper = map_work(work).unwrap();
        assert_eq!(paper.id, "crossref-10.1038/nature14539");
        assert_eq!(paper.title, "Deep learning");
        assert_eq!(paper.authors, vec!["Yann LeCun", "The Consortium"]);
        assert_eq!(paper.r#abstract, "Deep learning allows models.");
        assert_eq!(paper.year, 2015);
        assert_eq!(paper.venue.as_deref(), Some("Nature"));
        assert_eq!(paper.citation_count, 50000);
        assert_eq!(paper.doi(), Some("10.1038/nature14539"));
        assert_eq!(paper.fields, vec!["Multidisciplinary"]);
    }

    #[test]
    fn test_year_falls_back_to_created() {
        let work: Work = serde_json::from_value(serde_json::json!({
            "DOI": "10.1/x",
            "title": "Scalar title",
            "published": {"date-parts": [[null]]},
            "created": {"date-parts": [[2019, 1]]},
            "container-title": [],
            "publisher": "ACM"
        }))
        .unwrap();

        let paper = map_work(work).unwrap();
        assert_eq!(paper.title, "Scalar title");
        assert_eq!(paper.year, 2019);
        assert_eq!(paper.venue.as_deref(), Some("ACM"));
        assert_eq!(paper.r#abstract, crate::models::NO_ABSTRACT);
    }

    #[test]
    fn test_work_without_doi_is_skipped() {
        let work: Work = serde_json::from_value(serde_json::json!({"title": ["t"]})).unwrap();
        assert!(map_work(work).is_none());
    }
}
