//! Session mirror
//!
//! Issued session tokens and outstanding reset digests are copied into the
//! key-value cache under `token:<userId>` / `reset:<userId>`. Nothing reads
//! them for authorization; every write is best effort.

use std::sync::Arc;
use std::time::Duration;

use platform::best_effort;
use platform::cache::CacheStore;

use crate::domain::value_object::user_id::UserId;

pub fn token_key(user_id: &UserId) -> String {
    format!("token:{user_id}")
}

pub fn reset_key(user_id: &UserId) -> String {
    format!("reset:{user_id}")
}

pub struct SessionMirror<C> {
    cache: Arc<C>,
    token_ttl: Duration,
    reset_ttl: Duration,
}

impl<C> Clone for SessionMirror<C> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            token_ttl: self.token_ttl,
            reset_ttl: self.reset_ttl,
        }
    }
}

impl<C> SessionMirror<C>
where
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(cache: Arc<C>, token_ttl: Duration, reset_ttl: Duration) -> Self {
        Self {
            cache,
            token_ttl,
            reset_ttl,
        }
    }

    pub async fn remember_token(&self, user_id: &UserId, token: &str) {
        let key = token_key(user_id);
        best_effort::attempt(
            "session_cache.remember_token",
            self.cache.set_ex(&key, token, self.token_ttl),
        )
        .await;
    }

    pub async fn forget_token(&self, user_id: &UserId) {
        let keys = [token_key(user_id)];
        best_effort::attempt("session_cache.forget_token", self.cache.delete(&keys)).await;
    }

    pub async fn remember_reset(&self, user_id: &UserId, token_hash: &str) {
        let key = reset_key(user_id);
        best_effort::attempt(
            "session_cache.remember_reset",
            self.cache.set_ex(&key, token_hash, self.reset_ttl),
        )
        .await;
    }

    pub async fn forget_reset(&self, user_id: &UserId) {
        let keys = [reset_key(user_id)];
        best_effort::attempt("session_cache.forget_reset", self.cache.delete(&keys)).await;
    }
}
