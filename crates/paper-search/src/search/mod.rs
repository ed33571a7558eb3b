//! The aggregation pipeline: plan → fan out → deduplicate → filter → rank.

mod aggregator;
mod dedup;
mod filter;
mod planner;
mod ranking;
mod tracker;

pub use aggregator::Aggregator;
pub use dedup::{deduplicate, identity_key, normalize_doi, normalize_title};
pub use filter::FilterEngine;
pub use planner::{QueryDomain, QueryPlanner, classify};
pub use ranking::RelevanceRanker;
pub use tracker::{QueryToken, QueryTracker};

use std::sync::Arc;

use chrono::Datelike;

use crate::client::HttpClient;
use crate::config::{Config, RankingWeights};
use crate::error::SearchError;
use crate::models::{Paper, SearchFilters, SearchResult, Source};
use crate::sources::SourceRegistry;

/// Multi-source search engine.
///
/// Built once and shared; every search is independent of the others.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    registry: Arc<SourceRegistry>,
    planner: QueryPlanner,
    aggregator: Aggregator,
    weights: Arc<RankingWeights>,
}

impl SearchEngine {
    /// Build an engine with every built-in source.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let client = HttpClient::new(config)?;
        let registry = SourceRegistry::from_config(config, &client);
        Ok(Self::with_registry(config, registry))
    }

    /// Build an engine over an explicit set of adapters.
    #[must_use]
    pub fn with_registry(config: &Config, registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            planner: QueryPlanner::new(config.max_variants),
            aggregator: Aggregator::new(config.per_source_limit),
            weights: Arc::new(config.ranking.clone()),
        }
    }

    /// Registered sources, in dispatch order.
    #[must_use]
    pub fn sources(&self) -> Vec<Source> {
        self.registry.sources().collect()
    }

    /// Search every enabled source, using the current UTC year for recency.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] only if a post-aggregation stage fails.
    /// Source failures never surface here.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<SearchResult, SearchError> {
        self.search_at(query, filters, chrono::Utc::now().year()).await
    }

    /// Search with an explicit current year for the recency bonus.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] only if a post-aggregation stage fails.
    pub async fn search_at(
        &self,
        query: &str,
        filters: &SearchFilters,
        current_year: i32,
    ) -> Result<SearchResult, SearchError> {
        if query.trim().is_empty() {
            return Ok(SearchResult::empty(query));
        }

        let variants = self.planner.plan(query, filters);
        let adapters = self.registry.enabled(filters);
        tracing::info!(
            query,
            variants = variants.len(),
            sources = adapters.len(),
            "Dispatching search"
        );

        let candidates = self.aggregator.gather(&adapters, &variants).await;

        let ranker = RelevanceRanker::new((*self.weights).clone(), current_year);
        let filter = FilterEngine::new(filters);
        let ranking_query = query.to_string();

        let papers: Vec<Paper> = tokio::task::spawn_blocking(move || {
            let unique = deduplicate(candidates);
            let kept = filter.apply(unique);
            ranker.rank(&ranking_query, kept)
        })
        .await?;

        tracing::info!(query, results = papers.len(), "Search complete");
        Ok(SearchResult::new(query, papers))
    }
}
