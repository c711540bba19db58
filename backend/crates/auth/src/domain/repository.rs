//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    credentials::{Credentials, LockoutPolicy},
    user::User,
};
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
};
use crate::error::AuthResult;

/// User repository trait
///
/// Unique email / user name collisions surface as [`AuthError::UserExists`].
///
/// [`AuthError::UserExists`]: crate::error::AuthError::UserExists
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Persist a new user together with its credentials
    async fn create(&self, user: &User, credentials: &Credentials) -> AuthResult<()>;

    /// Number of registered users
    async fn count(&self) -> AuthResult<u64>;

    /// Whether the email or the user name is already taken (single query)
    async fn exists_by_email_or_user_name(
        &self,
        email: &Email,
        user_name: &UserName,
    ) -> AuthResult<bool>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// User owning an unexpired reset token with this digest
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>>;

    /// Load the credentials (hash, lockout, reset token) of a user
    async fn find_credentials(&self, user_id: &UserId) -> AuthResult<Option<Credentials>>;

    /// All users, newest first
    async fn list(&self) -> AuthResult<Vec<User>>;

    /// Update profile fields
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Stamp a successful login; no other column is touched
    async fn record_login(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<()>;

    /// Replace the password hash only
    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Store an outstanding reset token digest and its expiry
    async fn set_reset_token(
        &self,
        user_id: &UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Withdraw the reset token if it is still `token_hash`
    ///
    /// Returns `false` when a newer token (or none) is stored.
    async fn clear_reset_token(&self, user_id: &UserId, token_hash: &str) -> AuthResult<bool>;

    /// Apply one failed attempt atomically (see [`LockoutPolicy::after_failure`])
    async fn record_login_failure(
        &self,
        user_id: &UserId,
        policy: &LockoutPolicy,
        now: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Clear the failure counter and any lock
    async fn reset_login_attempts(&self, user_id: &UserId) -> AuthResult<()>;

    /// Set a new password and consume the reset token in one step
    ///
    /// Returns `false` when the token no longer matches (used or expired).
    async fn complete_password_reset(
        &self,
        user_id: &UserId,
        token_hash: &str,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<bool>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;
}
