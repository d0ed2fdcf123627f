//! In-memory page cache keyed by exact URL string.
//!
//! The cache is the cost-control layer of the fetch engine: a URL is never
//! re-fetched within the freshness window, no matter how many logical
//! callers ask for it.
//!
//! Keys are compared as raw strings — no normalization, no query-parameter
//! reordering. Callers construct canonical URLs (see [`crate::Config`]'s URL
//! builders) so that equivalent requests collide on the same key.
//!
//! Stale entries are not evicted; they stay resident and read as misses
//! until overwritten. Unbounded growth is an accepted trade-off: the target
//! workload is bounded by the number of distinct monitored players and
//! games.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::agent::Page;

/// A cached page and when it was stored.
#[derive(Debug, Clone)]
struct CachedEntry {
    page: Page,
    fetched_at: Instant,
}

/// URL-keyed store of fetched pages with TTL freshness checks.
///
/// Entries are replaced whole on refresh, never merged, and only after the
/// session manager has fully validated the response — a half-downloaded or
/// wrong page never reaches the cache.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: HashMap<String, CachedEntry>,
}

impl PageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached page for `url`, fresh or stale.
    ///
    /// Freshness is the caller's concern; combine with [`Self::is_fresh`].
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&Page> {
        self.entries.get(url).map(|entry| &entry.page)
    }

    /// Store `page` under `url`, replacing any previous entry.
    pub fn put(&mut self, url: &str, page: Page) {
        debug!(url, "caching page");
        self.entries.insert(
            url.to_string(),
            CachedEntry {
                page,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Whether a cached entry exists for `url` and is younger than
    /// `max_age`. A stale or absent entry both report `false`.
    #[must_use]
    pub fn is_fresh(&self, url: &str, max_age: Duration) -> bool {
        self.entries
            .get(url)
            .is_some_and(|entry| entry.fetched_at.elapsed() <= max_age)
    }

    /// Number of resident entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
