//! Canonical paper record shared by every source adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstract text used when a source supplies none.
pub const NO_ABSTRACT: &str = "No abstract available";

/// Abstract text used for PubMed summaries, which never carry abstracts.
pub const PUBMED_ABSTRACT: &str = "Abstract available on PubMed";

/// Title used when a source supplies none.
pub const UNTITLED: &str = "Untitled";

/// External bibliographic service a record came from.
///
/// Variant order is the registry's dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Semantic Scholar Graph API.
    #[serde(rename = "semantic-scholar")]
    SemanticScholar,
    /// arXiv preprint server.
    #[serde(rename = "arxiv")]
    Arxiv,
    /// Crossref DOI registry.
    #[serde(rename = "crossref")]
    Crossref,
    /// PubMed (NCBI E-utilities).
    #[serde(rename = "pubmed")]
    Pubmed,
    /// OpenAlex catalogue.
    #[serde(rename = "openalex")]
    OpenAlex,
    /// CORE open-access aggregator.
    #[serde(rename = "core")]
    Core,
}

impl Source {
    /// All known sources, in dispatch order.
    pub const ALL: [Self; 6] =
        [Self::SemanticScholar, Self::Arxiv, Self::Crossref, Self::Pubmed, Self::OpenAlex, Self::Core];

    /// Stable identifier used in filters and serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SemanticScholar => "semantic-scholar",
            Self::Arxiv => "arxiv",
            Self::Crossref => "crossref",
            Self::Pubmed => "pubmed",
            Self::OpenAlex => "openalex",
            Self::Core => "core",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::SemanticScholar => "Semantic Scholar",
            Self::Arxiv => "arXiv",
            Self::Crossref => "Crossref",
            Self::Pubmed => "PubMed",
            Self::OpenAlex => "OpenAlex",
            Self::Core => "CORE",
        }
    }

    /// Prefix of canonical paper ids from this source.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::SemanticScholar => "ss",
            _ => self.as_str(),
        }
    }

    /// Whether the source refuses anonymous access.
    #[must_use]
    pub const fn requires_credentials(self) -> bool {
        matches!(self, Self::Core)
    }

    /// Sources searched when the caller gives no allow-list.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        Self::ALL.into_iter().filter(|s| !s.requires_credentials()).collect()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| {
                source.as_str() == wanted || source.display_name().to_lowercase() == wanted
            })
            .ok_or_else(|| format!("unknown source '{s}'"))
    }
}

/// Identifiers attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifiers {
    /// Digital Object Identifier, as reported by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    /// PubMed ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,

    /// ArXiv preprint ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    /// Identifier native to the origin source.
    #[serde(default)]
    pub native_id: String,
}

/// A research paper in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// `{source prefix}-{native id}`.
    pub id: String,

    /// Paper title (`"Untitled"` when absent).
    pub title: String,

    /// Author display names, in byline order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Abstract, or a placeholder when the source has none.
    pub r#abstract: String,

    /// Publication year; 0 when unknown.
    #[serde(default)]
    pub year: i32,

    /// Publication venue (journal or conference).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    /// Citations reported by the source; 0 when not reported.
    #[serde(default)]
    pub citation_count: u64,

    /// Landing page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Direct PDF link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    /// Topic labels (fields of study, categories, concepts, subjects).
    #[serde(default)]
    pub fields: Vec<String>,

    /// Origin adapter.
    pub source: Source,

    /// DOI / PMID / native identifiers.
    #[serde(default)]
    pub identifiers: Identifiers,
}

impl Paper {
    /// Start a record with the source defaults applied.
    #[must_use]
    pub fn new(source: Source, native_id: impl Into<String>) -> Self {
        let native_id = native_id.into();
        Self {
            id: format!("{}-{}", source.id_prefix(), native_id),
            title: UNTITLED.to_string(),
            authors: Vec::new(),
            r#abstract: NO_ABSTRACT.to_string(),
            year: 0,
            venue: None,
            citation_count: 0,
            url: None,
            pdf_url: None,
            fields: Vec::new(),
            source,
            identifiers: Identifiers { native_id, ..Identifiers::default() },
        }
    }

    /// Set the title, keeping the placeholder for blank input.
    #[must_use]
    pub fn with_title(mut self, title: Option<&str>) -> Self {
        if let Some(title) = title.map(collapse_whitespace).filter(|t| !t.is_empty()) {
            self.title = title;
        }
        self
    }

    /// Set the abstract, keeping the placeholder for blank input.
    #[must_use]
    pub fn with_abstract(mut self, text: Option<&str>) -> Self {
        if let Some(text) = text.map(collapse_whitespace).filter(|t| !t.is_empty()) {
            self.r#abstract = text;
        }
        self
    }

    /// Set topic labels, dropping blanks and repeats.
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = Vec::new();
        for field in fields {
            let field = field.as_ref().trim();
            if !field.is_empty() && !labels.iter().any(|l| l == field) {
                labels.push(field.to_string());
            }
        }
        self.fields = labels;
        self
    }

    /// Set author names, dropping blanks.
    #[must_use]
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.authors = authors
            .into_iter()
            .map(|a| collapse_whitespace(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        self
    }

    /// Whether the abstract is real text rather than a placeholder.
    #[must_use]
    pub fn has_abstract(&self) -> bool {
        self.r#abstract != NO_ABSTRACT && self.r#abstract != PUBMED_ABSTRACT
    }

    /// Whether the publication year is known.
    #[must_use]
    pub const fn has_year(&self) -> bool {
        self.year > 0
    }

    /// Get the DOI if available.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.identifiers.doi.as_deref()
    }

    /// Get the first author's name if available.
    #[must_use]
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(String::as_str)
    }

    /// Get author names as a comma-separated string.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors.join(", ")
    }
}

/// One adapter call's settled payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePage {
    /// Papers mapped from this page.
    pub papers: Vec<Paper>,

    /// Total matches reported by the source (informational only).
    pub total: u64,

    /// Whether the source reports more results past this page.
    pub has_more: bool,
}

impl SourcePage {
    /// The degraded result of a failed or skipped call.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a page, deriving `has_more` from the requested window.
    #[must_use]
    pub fn new(papers: Vec<Paper>, total: u64, limit: u32, offset: u32) -> Self {
        let has_more = total > u64::from(offset) + u64::from(limit);
        Self { papers, total, has_more }
    }

    /// Check if the page carries no papers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}

/// Final, ranked result of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Papers, best first.
    pub papers: Vec<Paper>,

    /// Number of papers in `papers`.
    pub total: usize,

    /// The query exactly as the caller supplied it.
    pub query: String,
}

impl SearchResult {
    /// Wrap a ranked list.
    #[must_use]
    pub fn new(query: impl Into<String>, papers: Vec<Paper>) -> Self {
        Self { total: papers.len(), papers, query: query.into() }
    }

    /// An empty result echoing the query.
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self::new(query, Vec::new())
    }

    /// Check if no papers were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Keep only the first `limit` papers.
    #[must_use]
    pub fn truncated(mut self, limit: usize) -> Self {
        self.papers.truncate(limit);
        self.total = self.papers.len();
        self
    }
}

/// Trim and collapse internal runs of whitespace to single spaces.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_defaults() {
        let paper = Paper::new(Source::SemanticScholar, "abc123");
        assert_eq!(paper.id, "ss-abc123");
        assert_eq!(paper.title, UNTITLED);
        assert_eq!(paper.r#abstract, NO_ABSTRACT);
        assert_eq!(paper.year, 0);
        assert_eq!(paper.citation_count, 0);
        assert!(!paper.has_abstract());
        assert!(!paper.has_year());
        assert_eq!(paper.identifiers.native_id, "abc123");
    }

    #[test]
    fn test_paper_builders_skip_blanks() {
        let paper = Paper::new(Source::Arxiv, "2301.00001")
            .with_title(Some("  Attention\n  Is All   You Need "))
            .with_abstract(Some("   "))
            .with_authors(["Ashish Vaswani", " ", "Noam  Shazeer"])
            .with_fields(["cs.CL", "cs.LG", "cs.CL", ""]);

        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.r#abstract, NO_ABSTRACT);
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.fields, vec!["cs.CL", "cs.LG"]);
        assert_eq!(paper.first_author(), Some("Ashish Vaswani"));
    }

    #[test]
    fn test_pubmed_placeholder_is_not_an_abstract() {
        let mut paper = Paper::new(Source::Pubmed, "123");
        paper.r#abstract = PUBMED_ABSTRACT.to_string();
        assert!(!paper.has_abstract());
    }

    #[test]
    fn test_source_parse_and_display() {
        assert_eq!("semantic-scholar".parse::<Source>(), Ok(Source::SemanticScholar));
        assert_eq!("OpenAlex".parse::<Source>(), Ok(Source::OpenAlex));
        assert_eq!(" PUBMED ".parse::<Source>(), Ok(Source::Pubmed));
        assert!("scopus".parse::<Source>().is_err());
        assert_eq!(Source::Crossref.to_string(), "crossref");
    }

    #[test]
    fn test_source_serde_names() {
        let json = serde_json::to_string(&Source::SemanticScholar).unwrap();
        assert_eq!(json, "\"semantic-scholar\"");
        let source: Source = serde_json::from_str("\"openalex\"").unwrap();
        assert_eq!(source, Source::OpenAlex);
    }

    #[test]
    fn test_default_sources_exclude_credentialed() {
        let defaults = Source::defaults();
        assert_eq!(defaults.len(), 5);
        assert!(!defaults.contains(&Source::Core));
    }

    #[test]
    fn test_source_page_has_more() {
        let page = SourcePage::new(Vec::new(), 25, 10, 10);
        assert!(page.has_more);
        let page = SourcePage::new(Vec::new(), 20, 10, 10);
        assert!(!page.has_more);
        assert!(SourcePage::empty().is_empty());
    }

    #[test]
    fn test_search_result_truncated() {
        let papers = vec![
            Paper::new(Source::Arxiv, "1"),
            Paper::new(Source::Arxiv, "2"),
            Paper::new(Source::Arxiv, "3"),
        ];
        let result = SearchResult::new("q", papers).truncated(2);
        assert_eq!(result.total, 2);
        assert_eq!(result.papers.len(), 2);
        assert_eq!(result.query, "q");
    }
}
