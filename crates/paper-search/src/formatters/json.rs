//! JSON output formatting with token efficiency.

use serde_json::{Value, json};

use crate::models::{Paper, SearchResult};

/// Create a compact paper representation for JSON output.
///
/// Placeholder abstracts and empty optional fields are left out.
#[must_use]
pub fn compact_paper(paper: &Paper) -> Value {
    let mut obj = json!({
        "id": paper.id,
        "title": paper.title,
        "year": paper.year,
        "citations": paper.citation_count,
        "source": paper.source,
    });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(paper.authors);
    }

    if let Some(venue) = &paper.venue {
        obj["venue"] = json!(venue);
    }

    if let Some(doi) = paper.doi() {
        obj["doi"] = json!(doi);
    }

    if let Some(pmid) = &paper.identifiers.pmid {
        obj["pmid"] = json!(pmid);
    }

    if let Some(arxiv) = &paper.identifiers.arxiv_id {
        obj["arxiv"] = json!(arxiv);
    }

    if let Some(url) = &paper.url {
        obj["url"] = json!(url);
    }

    if let Some(pdf) = &paper.pdf_url {
        obj["pdf"] = json!(pdf);
    }

    if !paper.fields.is_empty() {
        obj["fields"] = json!(paper.fields);
    }

    if paper.has_abstract() {
        obj["abstract"] = json!(paper.r#abstract);
    }

    obj
}

/// Compact JSON envelope for a search result.
#[must_use]
pub fn compact_search_result(result: &SearchResult) -> Value {
    json!({
        "query": result.query,
        "total": result.total,
        "papers": result.papers.iter().map(compact_paper).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NO_ABSTRACT, Source};

    #[test]
    fn test_compact_paper() {
        let mut paper = Paper::new(Source::Crossref, "10.1/x")
            .with_title(Some("Test Paper"))
            .with_authors(["John Doe"]);
        paper.year = 2024;
        paper.citation_count = 42;
        paper.identifiers.doi = Some("10.1/x".to_string());

        let compact = compact_paper(&paper);

        assert_eq!(compact["id"], "crossref-10.1/x");
        assert_eq!(compact["title"], "Test Paper");
        assert_eq!(compact["year"], 2024);
        assert_eq!(compact["citations"], 42);
        assert_eq!(compact["source"], "crossref");
        assert_eq!(compact["authors"], json!(["John Doe"]));
        assert_eq!(compact["doi"], "10.1/x");
        assert!(compact.get("abstract").is_none());
        assert!(compact.get("pdf").is_none());
    }

    #[test]
    fn test_compact_search_result() {
        let paper = Paper::new(Source::Arxiv, "1").with_abstract(Some("Real text"));
        let result = SearchResult::new("q", vec![paper]);
        let value = compact_search_result(&result);
        assert_eq!(value["total"], 1);
        assert_eq!(value["query"], "q");
        assert_eq!(value["papers"][0]["abstract"], "Real text");
        assert_ne!(value["papers"][0]["abstract"], NO_ABSTRACT);
    }
}
