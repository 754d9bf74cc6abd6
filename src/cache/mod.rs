//! Page cache with stale-while-revalidate semantics
//!
//! Each rendered route is stored with the time it was generated and its
//! revalidation interval. Past the interval the page is still served, but
//! reported as stale so the caller can regenerate it in the background.
//! At most one regeneration per route is in flight.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A cached page
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub html: String,
    pub generated_at: Instant,
    pub revalidate: Duration,
    /// A background regeneration has been claimed
    pub regenerating: bool,
}

impl CacheEntry {
    fn is_stale(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.generated_at) >= self.revalidate
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Within the revalidation interval
    Fresh(String),
    /// Past the interval; serve it and regenerate
    Stale(String),
    /// Never generated (or evicted)
    Miss,
}

/// In-memory cache of rendered routes
#[derive(Debug, Default)]
pub struct PageCache {
    pages: RwLock<HashMap<String, CacheEntry>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly generated page, clearing any regeneration claim
    pub async fn insert(&self, route: &str, html: String, revalidate: Duration) {
        self.insert_at(route, html, revalidate, Instant::now()).await;
    }

    pub async fn insert_at(&self, route: &str, html: String, revalidate: Duration, now: Instant) {
        let mut pages = self.pages.write().await;
        pages.insert(
            route.to_string(),
            CacheEntry {
                html,
                generated_at: now,
                revalidate,
                regenerating: false,
            },
        );
    }

    /// Look up a route
    pub async fn lookup(&self, route: &str) -> Lookup {
        self.lookup_at(route, Instant::now()).await
    }

    pub async fn lookup_at(&self, route: &str, now: Instant) -> Lookup {
        let pages = self.pages.read().await;
        match pages.get(route) {
            Some(entry) if entry.is_stale(now) => Lookup::Stale(entry.html.clone()),
            Some(entry) => Lookup::Fresh(entry.html.clone()),
            None => Lookup::Miss,
        }
    }

    /// Claim the regeneration of a stale route. Returns false if the route
    /// is missing, still fresh, or already being regenerated.
    pub async fn begin_regeneration(&self, route: &str) -> bool {
        self.begin_regeneration_at(route, Instant::now()).await
    }

    pub async fn begin_regeneration_at(&self, route: &str, now: Instant) -> bool {
        let mut pages = self.pages.write().await;
        match pages.get_mut(route) {
            Some(entry) if entry.is_stale(now) && !entry.regenerating => {
                entry.regenerating = true;
                true
            }
            _ => false,
        }
    }

    /// Release a regeneration claim after a failure; the stale page stays
    pub async fn end_regeneration(&self, route: &str) {
        let mut pages = self.pages.write().await;
        if let Some(entry) = pages.get_mut(route) {
            entry.regenerating = false;
        }
    }

    /// Drop a route, e.g. after its post was deleted
    pub async fn remove(&self, route: &str) -> bool {
        self.pages.write().await.remove(route).is_some()
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pages.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_fresh_then_stale() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        cache.insert_at("/post/a/", "A".to_string(), MINUTE, t0).await;

        assert_eq!(
            cache.lookup_at("/post/a/", t0 + Duration::from_secs(59)).await,
            Lookup::Fresh("A".to_string())
        );
        assert_eq!(
            cache.lookup_at("/post/a/", t0 + MINUTE).await,
            Lookup::Stale("A".to_string())
        );
        assert_eq!(cache.lookup_at("/post/b/", t0).await, Lookup::Miss);
    }

    #[tokio::test]
    async fn test_single_regeneration_claim() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        cache.insert_at("/", "index".to_string(), MINUTE, t0).await;

        let later = t0 + Duration::from_secs(90);
        assert!(!cache.begin_regeneration_at("/", t0).await, "fresh pages are not regenerated");
        assert!(cache.begin_regeneration_at("/", later).await);
        assert!(!cache.begin_regeneration_at("/", later).await);

        // The stale page keeps being served while regenerating
        assert_eq!(
            cache.lookup_at("/", later).await,
            Lookup::Stale("index".to_string())
        );

        cache.end_regeneration("/").await;
        assert!(cache.begin_regeneration_at("/", later).await);
    }

    #[tokio::test]
    async fn test_insert_replaces_and_clears_claim() {
        let cache = PageCache::new();
        let t0 = Instant::now();
        cache.insert_at("/", "old".to_string(), MINUTE, t0).await;
        assert!(cache.begin_regeneration_at("/", t0 + MINUTE).await);

        let t1 = t0 + MINUTE;
        cache.insert_at("/", "new".to_string(), MINUTE, t1).await;
        assert_eq!(cache.lookup_at("/", t1).await, Lookup::Fresh("new".to_string()));
        assert!(cache.begin_regeneration_at("/", t1 + MINUTE).await);
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = PageCache::new();
        cache.insert("/post/a/", "A".to_string(), MINUTE).await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.remove("/post/a/").await);
        assert!(!cache.remove("/post/a/").await);
        assert!(cache.is_empty().await);
        assert_eq!(cache.lookup("/post/a/").await, Lookup::Miss);
    }
}
