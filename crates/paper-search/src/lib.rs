//! Multi-source academic paper search
//!
//! Fans a query out to Semantic Scholar, arXiv, Crossref, PubMed, OpenAlex and
//! CORE, then merges the answers into one deduplicated, filtered and ranked
//! list. Also serves the pipeline as a Model Context Protocol (MCP) server.
//!
//! # Features
//!
//! - **Six sources** behind one `SourceAdapter` trait; a failing source degrades
//!   to an empty page instead of failing the search
//! - **Query planning**: field, synonym and domain-suffix variants widen recall
//! - **Concurrent fan-out** over every (source × variant) pair on Tokio
//! - **Cached**: 5-minute TTL cache for GET responses
//!
//! # Example
//!
//! ```no_run
//! use paper_search::{config::Config, models::SearchFilters, search::SearchEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let engine = SearchEngine::from_config(&config)?;
//!
//!     let filters = SearchFilters::none().year_from(2020);
//!     let result = engine.search("crispr base editing", &filters).await?;
//!     println!("{} papers", result.total);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod search;
pub mod server;
pub mod sources;
pub mod tools;

pub use client::HttpClient;
pub use config::Config;
pub use error::{ClientError, SearchError, ToolError};
pub use models::{Paper, SearchFilters, SearchResult, Source};
pub use search::SearchEngine;
