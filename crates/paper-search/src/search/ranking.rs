//! Composite relevance scoring and stable ordering.

use std::cmp::Ordering;

use crate::config::RankingWeights;
use crate::models::Paper;

/// Scores papers against the original query and orders them best first.
#[derive(Debug, Clone)]
pub struct RelevanceRanker {
    weights: RankingWeights,
    current_year: i32,
}

impl RelevanceRanker {
    /// Create a ranker for a fixed current year.
    #[must_use]
    pub const fn new(weights: RankingWeights, current_year: i32) -> Self {
        Self { weights, current_year }
    }

    /// Lower-cased whitespace-separated query terms.
    #[must_use]
    pub fn terms(query: &str) -> Vec<String> {
        query.split_whitespace().map(str::to_lowercase).collect()
    }

    /// Score one paper.
    #[must_use]
    pub fn score(&self, paper: &Paper, terms: &[String]) -> f64 {
        let title = paper.title.to_lowercase();
        let abstract_text = paper.r#abstract.to_lowercase();

        let title_hits = terms.iter().filter(|t| title.contains(t.as_str())).count();
        let abstract_hits = terms.iter().filter(|t| abstract_text.contains(t.as_str())).count();

        let mut score = self.weights.title_match * title_hits as f64
            + self.weights.abstract_match * abstract_hits as f64
            + self.weights.citation * (paper.citation_count as f64 + 1.0).ln();

        if paper.year >= self.current_year - self.weights.recency_window {
            score += self.weights.recency_bonus;
        }

        score + self.weights.source_bonus(paper.source)
    }

    /// Reorder papers by descending score. Ties keep their input order.
    #[must_use]
    pub fn rank(&self, query: &str, papers: Vec<Paper>) -> Vec<Paper> {
        let terms = Self::terms(query);
        let mut scored: Vec<(f64, Paper)> =
            papers.into_iter().map(|p| (self.score(&p, &terms), p)).collect();

        // `sort_by` is stable.
        scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        scored.into_iter().map(|(_, paper)| paper).collect()
    }
}
