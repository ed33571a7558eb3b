//! Query expansion into a small set of recall-widening variants.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::config::vocabulary;
use crate::models::{SearchFilters, collapse_whitespace};

/// Compiled synonym table: concept pattern and its substitutes.
static SYNONYM_PATTERNS: LazyLock<Vec<(Regex, &'static [&'static str])>> = LazyLock::new(|| {
    vocabulary::SYNONYMS
        .iter()
        .map(|(concept, substitutes)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(concept));
            (Regex::new(&pattern).expect("valid synonym pattern"), *substitutes)
        })
        .collect()
});

/// Domain a query is classified into by keyword lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDomain {
    /// Health and life-science vocabulary.
    Medical,
    /// Computing and engineering vocabulary.
    Technical,
}

impl QueryDomain {
    const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Medical => vocabulary::MEDICAL_KEYWORDS,
            Self::Technical => vocabulary::TECHNICAL_KEYWORDS,
        }
    }

    const fn suffixes(self) -> &'static [&'static str] {
        match self {
            Self::Medical => vocabulary::MEDICAL_SUFFIXES,
            Self::Technical => vocabulary::TECHNICAL_SUFFIXES,
        }
    }
}

/// Expands a raw query into ordered, case-insensitively unique variants.
#[derive(Debug, Clone, Copy)]
pub struct QueryPlanner {
    max_variants: usize,
}

impl QueryPlanner {
    /// Create a planner keeping at most `max_variants` variants (at least one).
    #[must_use]
    pub fn new(max_variants: usize) -> Self {
        Self { max_variants: max_variants.max(1) }
    }

    /// Plan the variants for a query.
    ///
    /// The normalized raw query is always first. Then come field variants,
    /// synonym substitutions and domain suffixes, truncated to the cap.
    /// A blank query plans nothing.
    #[must_use]
    pub fn plan(&self, query: &str, filters: &SearchFilters) -> Vec<String> {
        let base = collapse_whitespace(query);
        if base.is_empty() {
            return Vec::new();
        }

        let mut variants = Variants::new(self.max_variants);
        variants.push(base.clone());

        for field in filters.requested_fields() {
            variants.push(format!("{base} {field}"));
        }

        for (pattern, substitutes) in SYNONYM_PATTERNS.iter() {
            if pattern.is_match(&base) {
                for substitute in *substitutes {
                    variants.push(pattern.replace_all(&base, NoExpand(substitute)).into_owned());
                }
            }
        }

        let words = words(&base);
        for domain in classify(&words) {
            for suffix in domain.suffixes() {
                if !words.iter().any(|w| w == suffix) {
                    variants.push(format!("{base} {suffix}"));
                }
            }
        }

        variants.into_inner()
    }
}

impl Default for QueryPlanner {
    fn default() -> Self {
        Self::new(crate::config::api::MAX_VARIANTS)
    }
}

/// Domains whose keywords appear among the query words, medical first.
#[must_use]
pub fn classify(words: &[String]) -> Vec<QueryDomain> {
    [QueryDomain::Medical, QueryDomain::Technical]
        .into_iter()
        .filter(|domain| words.iter().any(|w| domain.keywords().contains(&w.as_str())))
        .collect()
}

/// Lower-cased alphanumeric words of a query.
fn words(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Bounded, order-preserving, case-insensitive set of variants.
struct Variants {
    items: Vec<String>,
    seen: Vec<String>,
    cap: usize,
}

impl Variants {
    const fn new(cap: usize) -> Self {
        Self { items: Vec::new(), seen: Vec::new(), cap }
    }

    fn push(&mut self, variant: String) {
        let variant = collapse_whitespace(&variant);
        if variant.is_empty() || self.items.len() >= self.cap {
            return;
        }
        let folded = variant.to_lowercase();
        if !self.seen.contains(&folded) {
            self.seen.push(folded);
            self.items.push(variant);
        }
    }

    fn into_inner(self) -> Vec<String> {
        self.items
    }
}
