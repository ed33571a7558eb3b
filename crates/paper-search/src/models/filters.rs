//! User-supplied search constraints.

use serde::{Deserialize, Serialize};

use super::Source;

/// Constraints applied after deduplication.
///
/// Every field is optional; an absent value imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Minimum publication year (inclusive).
    #[serde(default)]
    pub year_from: Option<i32>,

    /// Maximum publication year (inclusive).
    #[serde(default)]
    pub year_to: Option<i32>,

    /// Minimum citation count (inclusive).
    #[serde(default)]
    pub min_citations: Option<u64>,

    /// Topic labels; a paper matches if any label contains any of these.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Source allow-list; `None` selects the default sources.
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

impl SearchFilters {
    /// No constraints.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the inclusive lower year bound.
    #[must_use]
    pub fn year_from(mut self, year: i32) -> Self {
        self.year_from = Some(year);
        self
    }

    /// Set the inclusive upper year bound.
    #[must_use]
    pub fn year_to(mut self, year: i32) -> Self {
        self.year_to = Some(year);
        self
    }

    /// Set the minimum citation count.
    #[must_use]
    pub fn min_citations(mut self, count: u64) -> Self {
        self.min_citations = Some(count);
        self
    }

    /// Add a topical field.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Restrict the search to these sources.
    #[must_use]
    pub fn sources<I: IntoIterator<Item = Source>>(mut self, sources: I) -> Self {
        self.sources = Some(sources.into_iter().collect());
        self
    }

    /// Trimmed, non-blank field strings, used to build query variants.
    pub fn requested_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty())
    }

    /// Whether a source is allowed, given the default set when no list is set.
    #[must_use]
    pub fn allows(&self, source: Source) -> bool {
        match &self.sources {
            Some(list) => list.contains(&source),
            None => !source.requires_credentials(),
        }
    }
}
