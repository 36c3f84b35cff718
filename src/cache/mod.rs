//! Cache module for page revalidation
//!
//! Rendered pages are kept per route together with the time they were
//! generated and how long they stay fresh. Once that interval has passed a
//! page is stale: it keeps being served while a single background
//! regeneration replaces it. A failed regeneration leaves the previous page
//! in place.
//!
//! Not-found and failure markers are capped at a fixed number of routes so
//! requests for arbitrary slugs cannot grow the cache without bound.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Default cap on cached not-found and failure markers
pub const MAX_NEGATIVE_ENTRIES: usize = 256;

/// A cached render result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// HTML of the page
    Page(String),
    /// The backend has no content for this route
    NotFound,
    /// The first render of this route failed
    Failed,
}

impl Rendered {
    /// Whether this is a marker rather than a page
    pub fn is_negative(&self) -> bool {
        !matches!(self, Self::Page(_))
    }
}

/// Cached render with metadata for revalidation decisions
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub rendered: Rendered,
    /// When this entry was generated
    pub generated_at: DateTime<Utc>,
    /// How long the entry stays fresh
    pub revalidate: Duration,
}

impl CacheEntry {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.generated_at);
        age.to_std().map(|age| age >= self.revalidate).unwrap_or(false)
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Within its revalidation interval
    Fresh(Rendered),
    /// Past its interval; serve it and regenerate
    Stale(Rendered),
    /// Never generated
    Missing,
}

/// Rendered pages shared across requests
#[derive(Debug, Clone)]
pub struct PageCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    regenerating: Arc<Mutex<HashSet<String>>>,
    max_negative: usize,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_negative_limit(MAX_NEGATIVE_ENTRIES)
    }
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache keeping at most `max_negative` not-found and failure markers
    pub fn with_negative_limit(max_negative: usize) -> Self {
        Self {
            entries: Arc::default(),
            regenerating: Arc::default(),
            max_negative,
        }
    }

    /// Look up a route
    pub async fn lookup(&self, route: &str) -> Lookup {
        self.lookup_at(route, Utc::now()).await
    }

    async fn lookup_at(&self, route: &str, now: DateTime<Utc>) -> Lookup {
        match self.entries.read().await.get(route) {
            Some(entry) if entry.is_stale(now) => Lookup::Stale(entry.rendered.clone()),
            Some(entry) => Lookup::Fresh(entry.rendered.clone()),
            None => Lookup::Missing,
        }
    }

    /// Store a freshly generated page
    pub async fn store(&self, route: &str, rendered: Rendered, revalidate: Duration) {
        let now = Utc::now();
        let negative = rendered.is_negative();
        let entry = CacheEntry {
            rendered,
            generated_at: now,
            revalidate,
        };

        let mut entries = self.entries.write().await;
        entries.insert(route.to_string(), entry);
        if negative {
            prune_negative(&mut entries, self.max_negative, now);
        }
        tracing::debug!(route = route, "cached page");
    }

    /// Record a failed render of `route`
    ///
    /// A page already cached for the route is kept; the failure only replaces
    /// a missing entry or an earlier failure.
    pub async fn store_failure(&self, route: &str, revalidate: Duration) {
        let keep = matches!(
            self.entries.read().await.get(route),
            Some(entry) if entry.rendered != Rendered::Failed
        );
        if keep {
            return;
        }
        self.store(route, Rendered::Failed, revalidate).await;
    }

    /// Claim the regeneration of `route`; `false` if one is already running
    pub fn try_begin(&self, route: &str) -> bool {
        match self.regenerating.lock() {
            Ok(mut set) => set.insert(route.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(route.to_string()),
        }
    }

    /// Release the claim taken by [`PageCache::try_begin`]
    pub fn finish(&self, route: &str) {
        match self.regenerating.lock() {
            Ok(mut set) => set.remove(route),
            Err(poisoned) => poisoned.into_inner().remove(route),
        };
    }

    /// Whether a regeneration of `route` is running
    pub fn is_regenerating(&self, route: &str) -> bool {
        match self.regenerating.lock() {
            Ok(set) => set.contains(route),
            Err(poisoned) => poisoned.into_inner().contains(route),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Drop markers over `max`: stale ones first, then the oldest
fn prune_negative(entries: &mut HashMap<String, CacheEntry>, max: usize, now: DateTime<Utc>) {
    let mut negative: Vec<(String, DateTime<Utc>, bool)> = entries
        .iter()
        .filter(|(_, entry)| entry.rendered.is_negative())
        .map(|(route, entry)| (route.clone(), entry.generated_at, entry.is_stale(now)))
        .collect();
    if negative.len() <= max {
        return;
    }

    // Stale first, then oldest first
    negative.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    let excess = negative.len() - max;
    for (route, _, _) in negative.into_iter().take(excess) {
        entries.remove(&route);
    }
    tracing::debug!(removed = excess, "pruned not-found markers");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_then_fresh() {
        let cache = PageCache::new();
        assert_eq!(cache.lookup("/").await, Lookup::Missing);

        cache
            .store("/", Rendered::Page("home".into()), Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.lookup("/").await,
            Lookup::Fresh(Rendered::Page("home".into()))
        );
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_after_interval() {
        let cache = PageCache::new();
        cache
            .store("/post/a", Rendered::NotFound, Duration::from_secs(60))
            .await;

        let later = Utc::now() + chrono::Duration::seconds(61);
        assert_eq!(
            cache.lookup_at("/post/a", later).await,
            Lookup::Stale(Rendered::NotFound)
        );
    }

    #[tokio::test]
    async fn test_store_replaces_entry() {
        let cache = PageCache::new();
        cache
            .store("/", Rendered::Page("old".into()), Duration::from_secs(0))
            .await;
        assert!(matches!(cache.lookup("/").await, Lookup::Stale(_)));

        cache
            .store("/", Rendered::Page("new".into()), Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.lookup("/").await,
            Lookup::Fresh(Rendered::Page("new".into()))
        );
    }

    #[test]
    fn test_single_regeneration_per_route() {
        let cache = PageCache::new();
        assert!(cache.try_begin("/"));
        assert!(!cache.try_begin("/"));
        assert!(cache.try_begin("/post/a"));
        assert!(cache.is_regenerating("/"));

        cache.finish("/");
        assert!(!cache.is_regenerating("/"));
        assert!(cache.try_begin("/"));
    }

    #[tokio::test]
    async fn test_negative_entries_are_bounded() {
        let cache = PageCache::with_negative_limit(10);
        cache
            .store("/", Rendered::Page("home".into()), Duration::from_secs(60))
            .await;

        for i in 0..100 {
            cache
                .store(
                    &format!("/post/unknown-{}", i),
                    Rendered::NotFound,
                    Duration::from_secs(60),
                )
                .await;
        }

        assert_eq!(cache.len().await, 11);
        // Pages are never pruned
        assert!(matches!(cache.lookup("/").await, Lookup::Fresh(_)));
        // The newest marker survives
        assert_eq!(
            cache.lookup("/post/unknown-99").await,
            Lookup::Fresh(Rendered::NotFound)
        );
    }

    #[tokio::test]
    async fn test_stale_markers_pruned_first() {
        let cache = PageCache::with_negative_limit(2);
        cache
            .store("/post/old", Rendered::NotFound, Duration::ZERO)
            .await;
        cache
            .store("/post/a", Rendered::NotFound, Duration::from_secs(60))
            .await;
        cache
            .store("/post/b", Rendered::Failed, Duration::from_secs(60))
            .await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.lookup("/post/old").await, Lookup::Missing);
    }

    #[tokio::test]
    async fn test_failure_keeps_existing_page() {
        let cache = PageCache::new();
        cache
            .store("/post/a", Rendered::Page("a".into()), Duration::ZERO)
            .await;
        cache.store_failure("/post/a", Duration::from_secs(60)).await;
        assert_eq!(
            cache.lookup("/post/a").await,
            Lookup::Stale(Rendered::Page("a".into()))
        );

        cache.store_failure("/post/b", Duration::from_secs(60)).await;
        assert_eq!(
            cache.lookup("/post/b").await,
            Lookup::Fresh(Rendered::Failed)
        );
    }
}
