//! Login Use Case
//!
//! Password login with failed-attempt lockout.
//!
//! Check order: unknown email → lock → deactivated → password. A locked
//! account is rejected even when the password is right.

use std::sync::Arc;

use chrono::Utc;
use platform::cache::CacheStore;

use crate::application::config::AuthConfig;
use crate::application::present;
use crate::application::token::{IssuedSession, TokenService};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};
use crate::infra::session_cache::SessionMirror;

pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct LoginUseCase<R, C> {
    repo: Arc<R>,
    mirror: SessionMirror<C>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R, C> LoginUseCase<R, C>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<IssuedSession> {
        let password = input.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (present(input.email), password) else {
            return Err(AuthError::validation("Email and password are required"));
        };

        // A malformed address cannot belong to anyone
        let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let credentials = self
            .repo
            .find_credentials(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let now = Utc::now();

        if credentials.is_locked(now) {
            tracing::warn!(user_id = %user.user_id, "Login rejected: account locked");
            return Err(AuthError::AccountLocked);
        }

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let candidate = RawPassword::for_verification(password);
        if !credentials
            .password_hash
            .verify(&candidate, self.config.pepper())
        {
            self.repo
                .record_login_failure(&user.user_id, &self.config.lockout, now)
                .await?;
            tracing::warn!(
                user_id = %user.user_id,
                attempts = credentials.login_attempts + 1,
                "Failed login attempt"
            );
            return Err(AuthError::InvalidCredentials);
        }

        if credentials.has_failures() {
            self.repo.reset_login_attempts(&user.user_id).await?;
        }

        self.repo.record_login(&user.user_id, now).await?;
        user.record_login(now);

        let token = self.tokens.issue(&user.user_id)?;
        self.mirror.remember_token(&user.user_id, &token).await;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(IssuedSession { user, token })
    }
}
