//! Caller-side supersession tracking for overlapping searches.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryToken(u64);

/// Hands out monotonically increasing tokens so a caller can discard results
/// of a query that a newer one has superseded.
///
/// The tracker never cancels work; it only answers "is this still the latest?".
#[derive(Debug, Default)]
pub struct QueryTracker {
    latest: AtomicU64,
}

impl QueryTracker {
    /// Create a tracker with no queries issued.
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: AtomicU64::new(0) }
    }

    /// Register a new query and return its token.
    pub fn begin(&self) -> QueryToken {
        QueryToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether no query was begun after `token`.
    #[must_use]
    pub fn is_current(&self, token: QueryToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}
