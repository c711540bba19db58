//! Logout Use Case
//!
//! Drops the mirrored token. Never fails; the handler always clears the cookie.

use platform::cache::CacheStore;

use crate::domain::value_object::user_id::UserId;
use crate::infra::session_cache::SessionMirror;

pub struct LogoutUseCase<C> {
    mirror: SessionMirror<C>,
}

impl<C> LogoutUseCase<C>
where
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(mirror: SessionMirror<C>) -> Self {
        Self { mirror }
    }

    pub async fn execute(&self, user_id: Option<&UserId>) {
        if let Some(user_id) = user_id {
            self.mirror.forget_token(user_id).await;
            tracing::info!(user_id = %user_id, "User logged out");
        }
    }
}
