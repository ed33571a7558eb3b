//! Data models for the aggregation pipeline.
//!
//! All models use `#[serde(rename_all = "camelCase")]` so the MCP and HTTP
//! surfaces can emit them directly.

mod filters;
mod inputs;
mod paper;

pub use filters::SearchFilters;
pub use inputs::{ResponseFormat, SearchPapersInput};
pub use paper::{
    Identifiers, NO_ABSTRACT, PUBMED_ABSTRACT, Paper, SearchResult, Source, SourcePage, UNTITLED,
    collapse_whitespace,
};
