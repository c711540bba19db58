//! Gallery read cache
//!
//! Read-through cache in front of the gallery store. Keys are derived from
//! the query shape; any write wipes every `gallery:*` key. The cache is
//! optional: an unreachable cache only costs a store round trip.
//!
//! Every invalidation first bumps [`GENERATION_KEY`]. A reader notes the
//! generation before it queries the store and only keeps its entry while
//! the generation is unchanged, so a snapshot taken before a write never
//! outlives that write.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use platform::best_effort;
use platform::cache::CacheStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::repository::ListFilter;
use crate::domain::value_object::{category::Category, image_id::ImageId};

/// Pattern matching every gallery key
pub const CACHE_PATTERN: &str = "gallery:*";

/// Write counter; outside [`CACHE_PATTERN`] so invalidation never resets it
pub const GENERATION_KEY: &str = "gallery_generation";

/// Keys per DEL command during invalidation
pub const DELETE_BATCH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    All,
    Active,
    Category {
        category: Category,
        active_only: bool,
    },
    Image(ImageId),
    Categories,
}

impl CacheKey {
    /// By category when filtered, else active-only, else everything
    pub fn for_listing(filter: &ListFilter) -> Self {
        match filter.category {
            Some(category) => CacheKey::Category {
                category,
                active_only: filter.active_only,
            },
            None if filter.active_only => CacheKey::Active,
            None => CacheKey::All,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::All => f.write_str("gallery:all"),
            CacheKey::Active => f.write_str("gallery:active"),
            CacheKey::Category {
                category,
                active_only: false,
            } => write!(f, "gallery:category:{category}"),
            CacheKey::Category {
                category,
                active_only: true,
            } => write!(f, "gallery:category:{category}:active"),
            CacheKey::Image(image_id) => write!(f, "gallery:image:{image_id}"),
            CacheKey::Categories => f.write_str("gallery:categories"),
        }
    }
}

/// A value and whether it came from the cache
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub value: T,
    pub from_cache: bool,
}

impl<T> Cached<T> {
    pub fn hit(value: T) -> Self {
        Self {
            value,
            from_cache: true,
        }
    }

    pub fn miss(value: T) -> Self {
        Self {
            value,
            from_cache: false,
        }
    }
}

pub struct GalleryCache<C> {
    store: Arc<C>,
    ttl: Duration,
}

impl<C> Clone for GalleryCache<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ttl: self.ttl,
        }
    }
}

impl<C> GalleryCache<C>
where
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<C>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Cached value for `key`; misses, outages and undecodable entries all yield `None`
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let raw = best_effort::attempt("gallery_cache.get", self.store.get(&key))
            .await
            .flatten()?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Current write generation; `None` when the cache cannot be reached
    pub async fn generation(&self) -> Option<i64> {
        let raw = best_effort::attempt("gallery_cache.generation", self.store.get(GENERATION_KEY))
            .await?;

        match raw {
            None => Some(0),
            Some(raw) => raw.parse().ok(),
        }
    }

    /// Store `value` read from the store at generation `seen`
    ///
    /// Skipped when a write has happened since; withdrawn when one lands
    /// while the entry is being written.
    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T, seen: Option<i64>) {
        let Some(seen) = seen else {
            return;
        };
        let key = key.to_string();

        if self.generation().await != Some(seen) {
            tracing::debug!(key = %key, "Skipping cache fill after concurrent write");
            return;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache value not serializable");
                return;
            }
        };

        if best_effort::attempt("gallery_cache.put", self.store.set_ex(&key, &raw, self.ttl))
            .await
            .is_none()
        {
            return;
        }

        if self.generation().await != Some(seen) {
            best_effort::attempt("gallery_cache.delete", self.store.delete(&[key])).await;
        }
    }

    /// Remove every gallery key, in batches of [`DELETE_BATCH`]
    pub async fn invalidate(&self) {
        best_effort::attempt("gallery_cache.generation", self.store.incr(GENERATION_KEY)).await;

        let Some(keys) =
            best_effort::attempt("gallery_cache.keys", self.store.keys(CACHE_PATTERN)).await
        else {
            return;
        };

        for batch in keys.chunks(DELETE_BATCH) {
            best_effort::attempt("gallery_cache.delete", self.store.delete(batch)).await;
        }

        tracing::debug!(keys = keys.len(), "Gallery cache invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::cache::{CacheResult, MemoryCache};

    #[test]
    fn test_listing_keys() {
        let key = |category, active_only| {
            CacheKey::for_listing(&ListFilter {
                category,
                active_only,
            })
            .to_string()
        };

        assert_eq!(key(None, false), "gallery:all");
        assert_eq!(key(None, true), "gallery:active");
        assert_eq!(key(Some(Category::Awards), false), "gallery:category:Awards");
        assert_eq!(
            key(Some(Category::Awards), true),
            "gallery:category:Awards:active"
        );
        assert_eq!(CacheKey::Categories.to_string(), "gallery:categories");
    }

    #[tokio::test]
    async fn test_invalidate_removes_more_than_one_batch() {
        let store = Arc::new(MemoryCache::new());
        let cache = GalleryCache::new(store.clone(), Duration::from_secs(60));

        for i in 0..250 {
            store
                .set_ex(&format!("gallery:image:{i}"), "{}", Duration::from_secs(60))
                .await
                .unwrap();
        }
        store
            .set_ex("token:someone", "t", Duration::from_secs(60))
            .await
            .unwrap();

        cache.invalidate().await;

        assert!(store.keys(CACHE_PATTERN).await.unwrap().is_empty());
        assert!(store.snapshot_keys().contains(&"token:someone".to_string()));
        assert_eq!(cache.generation().await, Some(1));
    }

    #[tokio::test]
    async fn test_outage_reads_as_miss() {
        let store = Arc::new(MemoryCache::new());
        let cache = GalleryCache::new(store.clone(), Duration::from_secs(60));
        let seen = cache.generation().await;
        cache.put(&CacheKey::All, &vec![1, 2, 3], seen).await;

        store.set_unavailable(true);
        assert_eq!(cache.generation().await, None);
        assert!(cache.get::<Vec<i32>>(&CacheKey::All).await.is_none());
        cache.invalidate().await;
        cache.put(&CacheKey::Active, &vec![4], None).await;

        store.set_unavailable(false);
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::All).await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_fill_started_before_a_write_is_dropped() {
        let store = Arc::new(MemoryCache::new());
        let cache = GalleryCache::new(store.clone(), Duration::from_secs(60));

        let seen = cache.generation().await;
        cache.invalidate().await;
        cache.put(&CacheKey::All, &vec![1], seen).await;
        assert!(cache.get::<Vec<i32>>(&CacheKey::All).await.is_none());

        let seen = cache.generation().await;
        cache.put(&CacheKey::All, &vec![1, 2], seen).await;
        assert_eq!(cache.get::<Vec<i32>>(&CacheKey::All).await, Some(vec![1, 2]));
    }

    /// Bumps the generation right after the first write lands
    struct WriteThenBump {
        inner: MemoryCache,
        armed: std::sync::atomic::AtomicBool,
    }

    impl CacheStore for WriteThenBump {
        async fn get(&self, key: &str) -> CacheResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
            self.inner.set_ex(key, value, ttl).await?;
            if self.armed.swap(false, std::sync::atomic::Ordering::SeqCst) {
                self.inner.incr(GENERATION_KEY).await?;
            }
            Ok(())
        }

        async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
            self.inner.delete(keys).await
        }

        async fn incr(&self, key: &str) -> CacheResult<i64> {
            self.inner.incr(key).await
        }

        async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
            self.inner.keys(pattern).await
        }

        async fn ping(&self) -> CacheResult<()> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_fill_overtaken_by_a_write_is_withdrawn() {
        let store = Arc::new(WriteThenBump {
            inner: MemoryCache::new(),
            armed: std::sync::atomic::AtomicBool::new(true),
        });
        let cache = GalleryCache::new(store.clone(), Duration::from_secs(60));

        let seen = cache.generation().await;
        cache.put(&CacheKey::Categories, &vec!["Events"], seen).await;

        assert!(cache.get::<Vec<String>>(&CacheKey::Categories).await.is_none());
        assert_eq!(cache.generation().await, Some(1));
    }
}
