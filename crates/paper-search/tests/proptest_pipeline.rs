//! Property-based tests for the deduplicate → filter → rank stages and the planner.

use std::collections::HashSet;

use proptest::prelude::*;

use paper_search::config::RankingWeights;
use paper_search::models::{Paper, SearchFilters, Source};
use paper_search::search::{FilterEngine, QueryPlanner, RelevanceRanker, deduplicate, identity_key};

fn arb_source() -> impl Strategy<Value = Source> {
    prop::sample::select(Source::ALL.to_vec())
}

/// Small alphabets so duplicates actually occur.
fn arb_paper() -> impl Strategy<Value = Paper> {
    (
        arb_source(),
        "[a-z0-9]{1,6}",                                 // native id
        "[A-Ca-c ]{0,8}",                                // title
        proptest::option::of("10\\.1/[a-c]{1,2}"),       // doi
        prop_oneof![Just(0i32), 1990i32..2030],          // year
        0u64..500,                                       // citations
        prop::collection::vec("(Medicine|Physics|Biology|Bio Engineering)", 0..3), // fields
    )
        .prop_map(|(source, id, title, doi, year, citations, fields)| {
            let mut paper = Paper::new(source, id).with_title(Some(title.as_str()));
            paper.identifiers.doi = doi;
            paper.year = year;
            paper.citation_count = citations;
            paper.fields = fields;
            paper
        })
}

fn arb_filters() -> impl Strategy<Value = SearchFilters> {
    (
        proptest::option::of(1990i32..2030),
        proptest::option::of(1990i32..2030),
        proptest::option::of(0u64..500),
        prop::collection::vec("(medicine|physics|bio|bio | )", 0..3),
    )
        .prop_map(|(year_from, year_to, min_citations, fields)| SearchFilters {
            year_from,
            year_to,
            min_citations,
            fields,
            sources: None,
        })
}

/// Reference predicate: bounds are inclusive and a non-empty field list
/// requires one label containing one requested string, as given.
fn satisfies(paper: &Paper, filters: &SearchFilters) -> bool {
    let fields_ok = filters.fields.is_empty()
        || paper.fields.iter().any(|label| {
            let label = label.to_lowercase();
            filters.fields.iter().any(|wanted| label.contains(&wanted.to_lowercase()))
        });
    filters.year_from.is_none_or(|from| paper.year >= from)
        && filters.year_to.is_none_or(|to| paper.year <= to)
        && filters.min_citations.is_none_or(|min| paper.citation_count >= min)
        && fields_ok
}

fn ids(papers: &[Paper]) -> Vec<String> {
    papers.iter().map(|p| p.id.clone()).collect()
}

proptest! {
    /// No two deduplicated papers share an identity key.
    #[test]
    fn dedup_leaves_unique_keys(papers in prop::collection::vec(arb_paper(), 0..40)) {
        let unique = deduplicate(papers);
        let mut seen = HashSet::new();
        for paper in &unique {
            if let Some(key) = identity_key(paper) {
                prop_assert!(seen.insert(key), "duplicate key survived");
            }
        }
    }

    /// Dedup keeps a subsequence of its input and is idempotent.
    #[test]
    fn dedup_is_order_preserving_and_idempotent(papers in prop::collection::vec(arb_paper(), 0..40)) {
        let input = ids(&papers);
        let once = deduplicate(papers);
        let mut rest = input.iter();
        for id in ids(&once) {
            prop_assert!(rest.any(|candidate| *candidate == id), "order changed");
        }
        let twice = deduplicate(once.clone());
        prop_assert_eq!(ids(&once), ids(&twice));
    }

    /// Applying two filter sets in either order gives the same papers.
    #[test]
    fn filters_commute(
        papers in prop::collection::vec(arb_paper(), 0..40),
        first in arb_filters(),
        second in arb_filters(),
    ) {
        let a = FilterEngine::new(&first);
        let b = FilterEngine::new(&second);
        let ab = b.apply(a.apply(papers.clone()));
        let ba = a.apply(b.apply(papers));
        prop_assert_eq!(ids(&ab), ids(&ba));
    }

    /// Kept papers satisfy every filter and rejected ones fail at least one,
    /// including unknown years and papers without field labels.
    #[test]
    fn filter_keeps_exactly_the_satisfying_papers(
        papers in prop::collection::vec(arb_paper(), 0..40),
        filters in arb_filters(),
    ) {
        let kept = FilterEngine::new(&filters).apply(papers.clone());
        for paper in &kept {
            if let Some(from) = filters.year_from {
                prop_assert!(paper.year >= from);
            }
            if let Some(to) = filters.year_to {
                prop_assert!(paper.year <= to);
            }
            if let Some(min) = filters.min_citations {
                prop_assert!(paper.citation_count >= min);
            }
            if !filters.fields.is_empty() {
                prop_assert!(!paper.fields.is_empty(), "label-less paper passed a field filter");
            }
        }

        let expected: Vec<String> =
            papers.iter().filter(|p| satisfies(p, &filters)).map(|p| p.id.clone()).collect();
        prop_assert_eq!(ids(&kept), expected);
    }

    /// Ranking is a permutation sorted by non-increasing score.
    #[test]
    fn ranking_is_sorted_permutation(
        papers in prop::collection::vec(arb_paper(), 0..40),
        query in "[a-c ]{0,6}",
    ) {
        let ranker = RelevanceRanker::new(RankingWeights::default(), 2025);
        let mut before = ids(&papers);
        let ranked = ranker.rank(&query, papers);

        let terms = RelevanceRanker::terms(&query);
        let scores: Vec<f64> = ranked.iter().map(|p| ranker.score(p, &terms)).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let mut after = ids(&ranked);
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    /// Equal-score papers keep their relative input order.
    #[test]
    fn ranking_is_stable(count in 1usize..20) {
        let papers: Vec<Paper> = (0..count)
            .map(|i| Paper::new(Source::Arxiv, i.to_string()).with_title(Some("same")))
            .collect();
        let expected = ids(&papers);
        let ranker = RelevanceRanker::new(RankingWeights::default(), 2025);
        prop_assert_eq!(ids(&ranker.rank("same", papers)), expected);
    }

    /// Plans never exceed the cap and always lead with the normalized query.
    #[test]
    fn planner_caps_and_leads_with_query(
        query in "[a-z]{1,8}( [a-z]{1,8}){0,3}",
        cap in 1usize..8,
        filters in arb_filters(),
    ) {
        let plan = QueryPlanner::new(cap).plan(&query, &filters);
        prop_assert!(!plan.is_empty());
        prop_assert!(plan.len() <= cap);
        prop_assert_eq!(&plan[0], &query);

        let distinct: HashSet<String> = plan.iter().map(|v| v.to_lowercase()).collect();
        prop_assert_eq!(distinct.len(), plan.len());
    }
}
