//! In-process Repository Implementation
//!
//! Same semantics as [`PgUserRepository`] without a database; used by tests
//! and local tooling.
//!
//! [`PgUserRepository`]: super::postgres::PgUserRepository

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    credentials::{Credentials, LockoutPolicy},
    user::User,
};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: Mutex<HashMap<UserId, (User, Credentials)>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, (User, Credentials)>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Unique email / user name among rows other than `skip`
fn collides(
    rows: &HashMap<UserId, (User, Credentials)>,
    skip: Option<&UserId>,
    email: &Email,
    user_name: &UserName,
) -> bool {
    rows.values().any(|(other, _)| {
        Some(&other.user_id) != skip
            && (other.email.as_str() == email.as_str()
                || other.user_name.as_str() == user_name.as_str())
    })
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User, credentials: &Credentials) -> AuthResult<()> {
        let mut rows = self.lock();
        if collides(&rows, None, &user.email, &user.user_name) {
            return Err(AuthError::UserExists);
        }
        rows.insert(user.user_id, (user.clone(), credentials.clone()));
        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        Ok(self.lock().len() as u64)
    }

    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> AuthResult<bool> {
        Ok(collides(&self.lock(), None, email, user_name))
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock().get(user_id).map(|(user, _)| user.clone()))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .values()
            .find(|(user, _)| user.email.as_str() == email.as_str())
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .values()
            .find(|(_, credentials)| credentials.reset_token_matches(token_hash, now))
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(&self, user_id: &UserId) -> AuthResult<Option<Credentials>> {
        Ok(self.lock().get(user_id).map(|(_, c)| c.clone()))
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let mut users: Vec<User> = self.lock().values().map(|(u, _)| u.clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut rows = self.lock();
        if collides(&rows, Some(&user.user_id), &user.email, &user.user_name) {
            return Err(AuthError::UserExists);
        }
        if let Some((stored, _)) = rows.get_mut(&user.user_id) {
            *stored = user.clone();
        }
        Ok(())
    }

    async fn record_login(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()> {
        if let Some((user, _)) = self.lock().get_mut(user_id) {
            user.record_login(now);
        }
        Ok(())
    }

    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some((user, stored)) = self.lock().get_mut(user_id) {
            stored.set_password(password_hash.clone());
            user.updated_at = now;
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: &UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some((_, stored)) = self.lock().get_mut(user_id) {
            stored.set_reset_token(token_hash.to_string(), expires_at);
        }
        Ok(())
    }

    async fn clear_reset_token(&self, user_id: &UserId, token_hash: &str) -> AuthResult<bool> {
        let mut rows = self.lock();
        match rows.get_mut(user_id) {
            Some((_, stored)) if stored.reset_token_hash.as_deref() == Some(token_hash) => {
                stored.clear_reset_token();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_login_failure(
        &self,
        user_id: &UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some((_, stored)) = self.lock().get_mut(user_id) {
            stored.record_failure(policy, now);
        }
        Ok(())
    }

    async fn reset_login_attempts(&self, user_id: &UserId) -> AuthResult<()> {
        if let Some((_, stored)) = self.lock().get_mut(user_id) {
            stored.reset_failures();
        }
        Ok(())
    }

    async fn complete_password_reset(
        &self,
        user_id: &UserId,
        token_hash: &str,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut rows = self.lock();
        let Some((user, stored)) = rows.get_mut(user_id) else {
            return Ok(false);
        };
        if !stored.reset_token_matches(token_hash, now) {
            return Ok(false);
        }
        stored.set_password(password_hash.clone());
        stored.clear_reset_token();
        user.updated_at = now;
        Ok(true)
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.lock().remove(user_id).is_some())
    }
}
