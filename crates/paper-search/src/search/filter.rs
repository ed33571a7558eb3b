//! Post-deduplication filtering.

use crate::models::{Paper, SearchFilters};

/// Applies [`SearchFilters`] to candidate papers.
///
/// Every predicate is independent, so the order of application does not
/// matter. A paper with an unknown year (0) is still subject to year bounds.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    year_from: Option<i32>,
    year_to: Option<i32>,
    min_citations: Option<u64>,
    fields: Vec<String>,
}

impl FilterEngine {
    /// Prepare the predicates once; requested fields are lower-cased here.
    ///
    /// Field strings are matched exactly as given, so a non-empty list is
    /// always a constraint, even when its entries are blank.
    #[must_use]
    pub fn new(filters: &SearchFilters) -> Self {
        Self {
            year_from: filters.year_from,
            year_to: filters.year_to,
            min_citations: filters.min_citations,
            fields: filters.fields.iter().map(|f| f.to_lowercase()).collect(),
        }
    }

    /// Whether a single paper passes every set predicate.
    #[must_use]
    pub fn matches(&self, paper: &Paper) -> bool {
        self.year_from.is_none_or(|from| paper.year >= from)
            && self.year_to.is_none_or(|to| paper.year <= to)
            && self.min_citations.is_none_or(|min| paper.citation_count >= min)
            && self.matches_fields(paper)
    }

    fn matches_fields(&self, paper: &Paper) -> bool {
        if self.fields.is_empty() {
            return true;
        }
        paper.fields.iter().any(|label| {
            let label = label.to_lowercase();
            self.fields.iter().any(|wanted| label.contains(wanted.as_str()))
        })
    }

    /// Keep matching papers, preserving order.
    #[must_use]
    pub fn apply(&self, papers: Vec<Paper>) -> Vec<Paper> {
        let before = papers.len();
        let kept: Vec<Paper> = papers.into_iter().filter(|p| self.matches(p)).collect();
        tracing::debug!(before, after = kept.len(), "Filtered candidates");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn paper(year: i32, citations: u64, fields: &[&str]) -> Paper {
        let mut paper = Paper::new(Source::OpenAlex, format!("{year}-{citations}"))
            .with_fields(fields.iter().copied());
        paper.year = year;
        paper.citation_count = citations;
        paper
    }

    #[test]
    fn test_no_filters_keep_everything() {
        let engine = FilterEngine::new(&SearchFilters::none());
        let papers = vec![paper(0, 0, &[]), paper(2020, 5, &["Biology"])];
        assert_eq!(engine.apply(papers).len(), 2);
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        let engine = FilterEngine::new(&SearchFilters::none().year_from(2018).year_to(2020));
        assert!(engine.matches(&paper(2018, 0, &[])));
        assert!(engine.matches(&paper(2020, 0, &[])));
        assert!(!engine.matches(&paper(2017, 0, &[])));
        assert!(!engine.matches(&paper(2021, 0, &[])));
    }

    #[test]
    fn test_unknown_year_is_not_exempt() {
        let engine = FilterEngine::new(&SearchFilters::none().year_from(2000));
        assert!(!engine.matches(&paper(0, 100, &[])));

        let upper = FilterEngine::new(&SearchFilters::none().year_to(2000));
        assert!(upper.matches(&paper(0, 100, &[])));
    }

    #[test]
    fn test_min_citations() {
        let engine = FilterEngine::new(&SearchFilters::none().min_citations(10));
        assert!(engine.matches(&paper(2020, 10, &[])));
        assert!(!engine.matches(&paper(2020, 9, &[])));
    }

    #[test]
    fn test_fields_match_any_substring_case_insensitive() {
        let engine = FilterEngine::new(&SearchFilters::none().field("bio").field("Physics"));
        assert!(engine.matches(&paper(2020, 0, &["Molecular Biology"])));
        assert!(engine.matches(&paper(2020, 0, &["Chemistry", "astrophysics"])));
        assert!(!engine.matches(&paper(2020, 0, &["Computer Science"])));
        assert!(!engine.matches(&paper(2020, 0, &[])));
    }

    #[test]
    fn test_blank_field_still_requires_a_label() {
        let engine = FilterEngine::new(&SearchFilters::none().field(" "));
        assert!(engine.apply(vec![paper(2020, 0, &[])]).is_empty());
        assert!(engine.matches(&paper(2020, 0, &["Molecular Biology"])));
        assert!(!engine.matches(&paper(2020, 0, &["Biology"])));
    }

    #[test]
    fn test_field_whitespace_is_significant() {
        let engine = FilterEngine::new(&SearchFilters::none().field("bio "));
        assert!(!engine.matches(&paper(2020, 0, &["Biology"])));
        assert!(engine.matches(&paper(2020, 0, &["Bio Engineering"])));
    }

    #[test]
    fn test_filters_commute() {
        let papers = vec![
            paper(2015, 50, &["Medicine"]),
            paper(2021, 5, &["Medicine"]),
            paper(2022, 50, &["Economics"]),
            paper(2023, 80, &["Clinical Medicine"]),
        ];
        let combined = SearchFilters::none().year_from(2020).min_citations(10).field("medicine");

        let all_at_once = FilterEngine::new(&combined).apply(papers.clone());

        let stepwise = FilterEngine::new(&SearchFilters::none().field("medicine")).apply(
            FilterEngine::new(&SearchFilters::none().min_citations(10))
                .apply(FilterEngine::new(&SearchFilters::none().year_from(2020)).apply(papers)),
        );

        assert_eq!(all_at_once, stepwise);
        assert_eq!(all_at_once.len(), 1);
        assert_eq!(all_at_once[0].year, 2023);
    }
}
