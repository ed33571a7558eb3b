//! First-seen-wins deduplication by DOI, falling back to title.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Paper, collapse_whitespace};

static DOI_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://(?:www\.|dx\.)?doi\.org/|doi:\s*)")
        .expect("valid DOI scheme pattern")
});

static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Lower-case a DOI and strip any resolver or `doi:` prefix.
#[must_use]
pub fn normalize_doi(doi: &str) -> String {
    let lower = doi.trim().to_lowercase();
    DOI_SCHEME.replace(&lower, "").trim().to_string()
}

/// Lower-case a title, drop punctuation and collapse whitespace.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    collapse_whitespace(&PUNCTUATION.replace_all(&title.to_lowercase(), ""))
}

/// Identity key of a paper: `doi:{normalized}` when a DOI is present,
/// `title:{normalized}` otherwise. `None` means the paper has no usable key.
#[must_use]
pub fn identity_key(paper: &Paper) -> Option<String> {
    if let Some(doi) = paper.doi().map(normalize_doi).filter(|d| !d.is_empty()) {
        return Some(format!("doi:{doi}"));
    }
    let title = normalize_title(&paper.title);
    (!title.is_empty()).then(|| format!("title:{title}"))
}

/// Keep the first paper of every identity class, preserving input order.
#[must_use]
pub fn deduplicate(papers: Vec<Paper>) -> Vec<Paper> {
    let before = papers.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<Paper> = papers
        .into_iter()
        .filter(|paper| identity_key(paper).is_none_or(|key| seen.insert(key)))
        .collect();

    tracing::debug!(before, after = unique.len(), "Deduplicated candidates");
    unique
}
