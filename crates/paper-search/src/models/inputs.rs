//! Input models for MCP tool parameters.

use serde::{Deserialize, Serialize};

use super::{SearchFilters, Source};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Input for the `search_papers` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPapersInput {
    /// Search query (e.g., "transformer attention mechanisms").
    pub query: String,

    /// Minimum publication year (inclusive).
    #[serde(default)]
    pub year_from: Option<i32>,

    /// Maximum publication year (inclusive).
    #[serde(default)]
    pub year_to: Option<i32>,

    /// Minimum citation count filter.
    #[serde(default)]
    pub min_citations: Option<u64>,

    /// Filter by topical fields (e.g., ["Computer Science", "Medicine"]).
    #[serde(default)]
    pub fields: Vec<String>,

    /// Sources to search; omitted means every source that needs no key.
    #[serde(default)]
    pub sources: Option<Vec<String>>,

    /// Maximum papers to display.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_limit() -> usize {
    20
}

impl SearchPapersInput {
    /// Convert to engine filters, rejecting unknown source names.
    pub fn filters(&self) -> Result<SearchFilters, String> {
        let sources = match &self.sources {
            Some(names) => Some(
                names.iter().map(|name| name.parse::<Source>()).collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(SearchFilters {
            year_from: self.year_from,
            year_to: self.year_to,
            min_citations: self.min_citations,
            fields: self.fields.clone(),
            sources,
        })
    }
}
