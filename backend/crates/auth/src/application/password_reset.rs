//! Password Reset Use Cases
//!
//! 1. forgot-password issues a random token, stores its SHA-256 digest with a
//!    one hour expiry and mails the plaintext link.
//! 2. verify-reset-token probes a token without consuming it.
//! 3. reset-password consumes the token, sets the new password and opens a
//!    session.
//!
//! Unknown addresses get the same answer as known ones.

use std::sync::Arc;

use chrono::Utc;
use platform::cache::CacheStore;
use platform::crypto::{random_token_hex, sha256_hex};

use crate::application::config::AuthConfig;
use crate::application::present;
use crate::application::token::{IssuedSession, TokenService};
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};
use crate::infra::session_cache::SessionMirror;

/// Random bytes in a reset token (hex encoded: 64 characters)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Digest stored for a plaintext reset token
pub fn reset_token_digest(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

// ============================================================================
// Forgot Password
// ============================================================================

pub struct ForgotPasswordUseCase<R, C, N> {
    repo: Arc<R>,
    mirror: SessionMirror<C>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<R, C, N> ForgotPasswordUseCase<R, C, N>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        mirror: SessionMirror<C>,
        notifier: Arc<N>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            mirror,
            notifier,
            config,
        }
    }

    /// `Ok(())` both when a link was sent and when no such account exists
    pub async fn execute(&self, email: Option<String>) -> AuthResult<()> {
        let email = present(email).ok_or_else(|| AuthError::validation("Email is required"))?;

        let Ok(email) = Email::new(email) else {
            return Ok(());
        };

        let Some(user) = self.repo.find_by_email(&email).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let token = random_token_hex(RESET_TOKEN_BYTES);
        let digest = reset_token_digest(&token);
        let ttl = chrono::Duration::from_std(self.config.reset_token_ttl)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.repo
            .set_reset_token(&user.user_id, &digest, Utc::now() + ttl)
            .await?;

        let reset_url = self.config.reset_url(&token);

        if let Err(e) = self
            .notifier
            .send_password_reset(&user.email, &reset_url)
            .await
        {
            // Only this token is withdrawn; a newer request keeps its own
            if let Err(rollback) = self.repo.clear_reset_token(&user.user_id, &digest).await {
                tracing::error!(
                    user_id = %user.user_id,
                    error = %rollback,
                    "Failed to withdraw undelivered reset token"
                );
            }
            return Err(AuthError::ResetDeliveryFailed(e));
        }

        self.mirror.remember_reset(&user.user_id, &digest).await;

        tracing::info!(user_id = %user.user_id, "Password reset email sent");
        Ok(())
    }
}

// ============================================================================
// Verify Reset Token
// ============================================================================

pub struct VerifyResetTokenUseCase<R> {
    repo: Arc<R>,
}

impl<R> VerifyResetTokenUseCase<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        if token.is_empty() {
            return Err(AuthError::validation("Token is required"));
        }

        self.repo
            .find_by_reset_token(&reset_token_digest(token), Utc::now())
            .await?
            .map(|_| ())
            .ok_or(AuthError::InvalidResetToken)
    }
}

// ============================================================================
// Reset Password
// ============================================================================

pub struct ResetPasswordInput {
    pub token: Option<String>,
    pub password: Option<String>,
}

pub struct ResetPasswordUseCase<R, C> {
    repo: Arc<R>,
    mirror: SessionMirror<C>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R, C> ResetPasswordUseCase<R, C>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        mirror: SessionMirror<C>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            mirror,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<IssuedSession> {
        let (Some(token), Some(password)) = (present(input.token), present(input.password))
        else {
            return Err(AuthError::validation("Token and password are required"));
        };

        let password = RawPassword::new(password)?;
        let digest = reset_token_digest(&token);
        let now = Utc::now();

        let user = self
            .repo
            .find_by_reset_token(&digest, now)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;

        // Single use: a concurrent reset with the same token loses here
        if !self
            .repo
            .complete_password_reset(&user.user_id, &digest, &password_hash, now)
            .await?
        {
            return Err(AuthError::InvalidResetToken);
        }

        self.mirror.forget_reset(&user.user_id).await;

        let token = self.tokens.issue(&user.user_id)?;
        self.mirror.remember_token(&user.user_id, &token).await;

        tracing::info!(user_id = %user.user_id, "Password reset completed");

        Ok(IssuedSession { user, token })
    }
}
