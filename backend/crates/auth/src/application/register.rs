//! Register Use Case
//!
//! Creates an account. The very first account becomes the administrator;
//! every later one is a plain user whatever role was requested.

use std::sync::Arc;

use platform::best_effort;
use platform::cache::CacheStore;

use crate::application::config::AuthConfig;
use crate::application::present;
use crate::application::token::{IssuedSession, TokenService};
use crate::domain::entity::{credentials::Credentials, user::User};
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::session_cache::SessionMirror;

pub struct RegisterInput {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Only informative; ignored unless this is the first account
    pub requested_role: Option<String>,
}

pub struct RegisterUseCase<R, C, N> {
    repo: Arc<R>,
    mirror: SessionMirror<C>,
    notifier: Arc<N>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<R, C, N> RegisterUseCase<R, C, N>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        mirror: SessionMirror<C>,
        notifier: Arc<N>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            mirror,
            notifier,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<IssuedSession> {
        let (Some(user_name), Some(email), Some(password)) = (
            present(input.user_name),
            present(input.email),
            present(input.password),
        ) else {
            return Err(AuthError::validation(
                "Username, email, and password are required",
            ));
        };

        let user_name = UserName::new(&user_name)?;
        let email = Email::new(email)?;
        let password = RawPassword::new(password)?;

        if self
            .repo
            .exists_by_email_or_user_name(&email, &user_name)
            .await?
        {
            return Err(AuthError::UserExists);
        }

        let user_role = if self.repo.count().await? == 0 {
            UserRole::Admin
        } else {
            if input.requested_role.as_deref() == Some(UserRole::Admin.code()) {
                tracing::warn!(email = %email, "Requested admin role ignored");
            }
            UserRole::User
        };

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        let user = User::new(user_name, email, user_role);
        let credentials = Credentials::new(user.user_id, password_hash);

        self.repo.create(&user, &credentials).await?;

        let token = self.tokens.issue(&user.user_id)?;
        self.mirror.remember_token(&user.user_id, &token).await;

        best_effort::attempt(
            "notify.welcome",
            self.notifier.send_welcome(&user.email, &user.user_name),
        )
        .await;

        tracing::info!(user_id = %user.user_id, role = %user.user_role, "User registered");

        Ok(IssuedSession { user, token })
    }
}
