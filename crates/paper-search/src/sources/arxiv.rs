//! arXiv Atom feed adapter.

use std::sync::LazyLock;
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use reqwest::header::HeaderMap;

use super::SourceAdapter;
use crate::client::{HttpClient, params};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{Paper, Source, SourcePage};

/// Venue reported for every preprint.
const VENUE: &str = "arXiv";

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+$").expect("valid version pattern"));

/// Queries the arXiv export API and parses its Atom response.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl ArxivSource {
    /// Create the adapter from shared configuration.
    #[must_use]
    pub fn new(config: &Config, client: HttpClient) -> Self {
        Self { client, base_url: config.urls.arxiv.clone(), timeout: config.adapter_timeout }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ArxivSource {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    fn call_timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, query: &str, limit: u32, offset: u32) -> ClientResult<SourcePage> {
        let query_params = params([
            ("search_query", format!("all:{query}")),
            ("start", offset.to_string()),
            ("max_results", limit.to_string()),
            ("sortBy", "relevance".to_string()),
            ("sortOrder", "descending".to_string()),
        ]);

        let xml = self.client.get_text(&self.base_url, &query_params, HeaderMap::new()).await?;
        let (papers, total) = parse_atom_feed(&xml)?;
        Ok(SourcePage::new(papers, total, limit, offset))
    }
}

/// Fields collected for one `<entry>`.
#[derive(Debug, Default)]
struct AtomEntry {
    id: String,
    title: String,
    summary: String,
    published: String,
    doi: String,
    authors: Vec<String>,
    categories: Vec<String>,
    pdf_url: Option<String>,
    web_url: Option<String>,
}

impl AtomEntry {
    fn push_text(&mut self, element: &str, parent: Option<&str>, text: &str) {
        match (element, parent) {
            ("id", Some("entry")) => self.id.push_str(text),
            ("title", Some("entry")) => self.title.push_str(text),
            ("summary", Some("entry")) => self.summary.push_str(text),
            ("published", Some("entry")) => self.published.push_str(text),
            ("arxiv:doi", Some("entry")) => self.doi.push_str(text),
            ("name", Some("author")) => match self.authors.last_mut() {
                Some(name) => name.push_str(text),
                None => self.authors.push(text.to_string()),
            },
            _ => {}
        }
    }

    fn absorb_attributes(&mut self, element: &str, tag: &BytesStart<'_>) -> ClientResult<()> {
        match element {
            "link" => {
                let mut href = None;
                let mut rel = None;
                let mut link_type = None;
                for attr in tag.attributes().flatten() {
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.as_ref() {
                        b"href" => href = Some(value),
                        b"rel" => rel = Some(value),
                        b"type" => link_type = Some(value),
                        _ => {}
                    }
                }
                if let Some(href) = href {
                    if link_type.as_deref() == Some("application/pdf") {
                        self.pdf_url = Some(href);
                    } else if rel.as_deref() == Some("alternate") {
                        self.web_url = Some(href);
                    }
                }
            }
            "category" | "arxiv:primary_category" => {
                for attr in tag.attributes().flatten() {
                    if attr.key.as_ref() == b"term" {
                        self.categories.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn into_paper(self) -> Option<Paper> {
        let id = self.id.trim();
        // The API reports query errors as a single entry under /api/errors.
        if id.is_empty() || id.contains("/api/errors") {
            return None;
        }

        let native_id = id.rsplit('/').next().unwrap_or(id).to_string();
        let arxiv_id = VERSION_SUFFIX.replace(&native_id, "").into_owned();

        let mut paper = Paper::new(Source::Arxiv, native_id)
            .with_title(Some(&self.title))
            .with_abstract(Some(&self.summary))
            .with_authors(&self.authors)
            .with_fields(&self.categories);

        paper.year = self.published.trim().get(..4).and_then(|y| y.parse().ok()).unwrap_or(0);
        paper.venue = Some(VENUE.to_string());
        paper.url = self.web_url.or_else(|| Some(id.to_string()));
        paper.pdf_url = self.pdf_url;
        paper.identifiers.arxiv_id = Some(arxiv_id);
        let doi = self.doi.trim();
        if !doi.is_empty() {
            paper.identifiers.doi = Some(doi.to_string());
        }

        Some(paper)
    }
}

/// Parse an arXiv Atom feed into papers and the reported total.
///
/// # Errors
///
/// Returns [`crate::error::ClientError::Xml`] when the document is not well-formed.
pub fn parse_atom_feed(xml: &str) -> ClientResult<(Vec<Paper>, u64)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut papers = Vec::new();
    let mut total: Option<u64> = None;
    let mut path: Vec<String> = Vec::new();
    let mut entry: Option<AtomEntry> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "entry" {
                    entry = Some(AtomEntry::default());
                } else if let Some(current) = entry.as_mut() {
                    if name == "author" {
                        current.authors.push(String::new());
                    }
                    current.absorb_attributes(&name, &e)?;
                }
                path.push(name);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(current) = entry.as_mut() {
                    current.absorb_attributes(&name, &e)?;
                }
            }
            Event::Text(e) => {
                let text = e.unescape()?;
                let element = path.last().map_or("", String::as_str);
                let parent = path.len().checked_sub(2).and_then(|i| path.get(i)).map(String::as_str);
                match entry.as_mut() {
                    Some(current) => current.push_text(element, parent, &text),
                    None if element == "opensearch:totalResults" => {
                        total = text.trim().parse().ok();
                    }
                    None => {}
                }
            }
            Event::End(e) => {
                path.pop();
                if e.name().as_ref() == b"entry" {
                    if let Some(paper) = entry.take().and_then(AtomEntry::into_paper) {
                        papers.push(paper);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let total = total.unwrap_or(papers.len() as u64);
    Ok((papers, total))
}
