//! Key-Value Cache
//!
//! [`CacheStore`] is the seam between the services and the cache backend.
//! [`RedisCache`] is the production implementation; [`MemoryCache`] keeps
//! everything in-process and can simulate an outage.
//!
//! Callers treat the cache as advisory: every error is expected to be logged
//! and swallowed, never propagated to the client.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// No cache backend configured
    #[error("Cache is not configured")]
    Disabled,

    /// Backend did not answer in time
    #[error("Cache operation timed out")]
    Timeout,

    /// Backend unreachable (in-process outage)
    #[error("Cache is unavailable")]
    Unavailable,

    /// Counter key holds something other than an integer
    #[error("Value at {0} is not an integer")]
    NotAnInteger(String),

    /// Redis protocol / connection error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operations used by the services
#[trait_variant::make(CacheStore: Send)]
pub trait LocalCacheStore {
    /// Read a value
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Write a value with a TTL
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Delete keys, returning how many existed
    async fn delete(&self, keys: &[String]) -> CacheResult<u64>;

    /// Increment an integer counter (no expiry), returning the new value
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// List keys matching a glob pattern (`prefix:*`)
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Liveness probe
    async fn ping(&self) -> CacheResult<()>;
}

// ============================================================================
// Redis
// ============================================================================

/// Redis-backed cache
///
/// The connection is opened lazily on first use and shared afterwards.
/// A failed connect is retried on the next call.
pub struct RedisCache {
    client: Option<redis::Client>,
    connection: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisCache {
    /// Default per-operation timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Create a cache for `url` (`redis://` or `rediss://`). Does not connect.
    pub fn new(url: &str) -> CacheResult<Self> {
        Ok(Self {
            client: Some(redis::Client::open(url)?),
            connection: OnceCell::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// A cache that is always off; every call fails with [`CacheError::Disabled`]
    pub fn disabled() -> Self {
        Self {
            client: None,
            connection: OnceCell::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let client = self.client.as_ref().ok_or(CacheError::Disabled)?;

        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = tokio::time::timeout(self.timeout, client.get_connection_manager())
                    .await
                    .map_err(|_| CacheError::Timeout)??;
                tracing::info!("Connected to Redis");
                Ok::<_, CacheError>(manager)
            })
            .await?;

        Ok(manager.clone())
    }

    async fn bounded<F, T>(&self, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout)?
            .map_err(CacheError::from)
    }
}

impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let seconds = ttl.as_secs().max(1);
        let _: () = self.bounded(conn.set_ex(key, value, seconds)).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let removed: u64 = self.bounded(conn.del(keys.to_vec())).await?;
        Ok(removed)
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        let mut conn = self.connection().await?;
        let value: i64 = self.bounded(conn.incr(key, 1)).await?;
        Ok(value)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = self.bounded(conn.keys(pattern)).await?;
        Ok(keys)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _pong: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}

// ============================================================================
// In-process
// ============================================================================

/// Value and expiry (`None` never expires)
type Entry = (String, Option<Instant>);

fn live(expires: &Option<Instant>, now: Instant) -> bool {
    expires.is_none_or(|at| at > now)
}

/// In-process cache with TTL support
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`CacheError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Live (non-expired) keys, sorted
    pub fn snapshot_keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, (_, expires))| live(expires, now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    fn check(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map only means another test thread panicked mid-write.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn glob_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}

impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        let mut entries = self.lock();
        match entries.get(key) {
            Some((value, expires)) if live(expires, Instant::now()) => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.lock()
            .insert(key.to_string(), (value.to_string(), Some(Instant::now() + ttl)));
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> CacheResult<u64> {
        self.check()?;
        let mut entries = self.lock();
        Ok(keys.iter().filter(|k| entries.remove(*k).is_some()).count() as u64)
    }

    async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.check()?;
        let mut entries = self.lock();
        let now = Instant::now();
        let current = match entries.get(key) {
            Some((value, expires)) if live(expires, now) => value
                .parse::<i64>()
                .map_err(|_| CacheError::NotAnInteger(key.to_string()))?,
            _ => 0,
        };
        let next = current + 1;
        let expires = entries.get(key).and_then(|(_, e)| *e).filter(|at| *at > now);
        entries.insert(key.to_string(), (next.to_string(), expires));
        Ok(next)
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        let now = Instant::now();
        Ok(self
            .lock()
            .iter()
            .filter(|(k, (_, expires))| live(expires, now) && glob_matches(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }
}
