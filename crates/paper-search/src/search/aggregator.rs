//! Concurrent fan-out over (adapter × variant) with failure isolation.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use crate::models::{Paper, SourcePage};
use crate::sources::SourceAdapter;

/// Dispatches one call per (adapter, variant) pair and concatenates results.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    per_source_limit: u32,
}

impl Aggregator {
    /// Create an aggregator requesting `per_source_limit` papers per call.
    #[must_use]
    pub const fn new(per_source_limit: u32) -> Self {
        Self { per_source_limit }
    }

    /// Run every call concurrently and wait for all of them to settle.
    ///
    /// The result follows dispatch order (adapter order, then variant order)
    /// regardless of completion order. A call whose task panics contributes
    /// nothing; its siblings are unaffected.
    pub async fn gather(
        &self,
        adapters: &[Arc<dyn SourceAdapter>],
        variants: &[String],
    ) -> Vec<Paper> {
        let mut labels = Vec::with_capacity(adapters.len() * variants.len());
        let mut handles = Vec::with_capacity(adapters.len() * variants.len());

        for adapter in adapters {
            for variant in variants {
                let adapter = Arc::clone(adapter);
                let query = variant.clone();
                let limit = self.per_source_limit;
                labels.push((adapter.source(), variant.as_str()));
                handles.push(tokio::spawn(async move { adapter.search(&query, limit, 0).await }));
            }
        }

        let settled = join_all(handles).await;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for ((source, variant), outcome) in labels.into_iter().zip(settled) {
            let page = match outcome {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(source = %source, variant, error = %error, "Source task failed");
                    SourcePage::empty()
                }
            };
            tracing::debug!(source = %source, variant, count = page.papers.len(), "Call settled");

            candidates.extend(page.papers.into_iter().filter(|paper| seen.insert(paper.id.clone())));
        }

        tracing::debug!(calls = adapters.len() * variants.len(), candidates = candidates.len(), "Aggregated");
        candidates
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(crate::config::api::PER_SOURCE_LIMIT)
    }
}
