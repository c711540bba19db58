//! Change Password Use Case
//!
//! Requires the current password. Existing tokens stay valid.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::present;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct ChangePasswordInput {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct ChangePasswordUseCase<R> {
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, user_id: &UserId, input: ChangePasswordInput) -> AuthResult<()> {
        let (Some(current), Some(new)) = (
            present(input.current_password),
            present(input.new_password),
        ) else {
            return Err(AuthError::validation(
                "Current password and new password are required",
            ));
        };

        let new = RawPassword::new(new).map_err(|e| {
            AuthError::validation(format!("New {}", e.message().to_lowercase()))
        })?;

        let credentials = self
            .repo
            .find_credentials(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let pepper = self.config.pepper();
        let current = RawPassword::for_verification(current);

        if !credentials.password_hash.verify(&current, pepper) {
            return Err(AuthError::CurrentPasswordIncorrect);
        }

        if credentials.password_hash.verify(&new, pepper) {
            return Err(AuthError::SamePassword);
        }

        let password_hash = UserPassword::from_raw(&new, pepper)?;
        self.repo
            .update_password(user_id, &password_hash, Utc::now())
            .await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
