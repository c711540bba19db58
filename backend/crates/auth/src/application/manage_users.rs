//! User Administration Use Case

use std::sync::Arc;

use platform::cache::CacheStore;

use crate::application::present;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::session_cache::SessionMirror;

/// Partial profile update; absent fields are left unchanged
#[derive(Default)]
pub struct UpdateUserInput {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub struct ManageUsersUseCase<R, C> {
    repo: Arc<R>,
    mirror: SessionMirror<C>,
}

impl<R, C> ManageUsersUseCase<R, C>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, mirror: SessionMirror<C>) -> Self {
        Self { repo, mirror }
    }

    /// All users, newest first
    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.repo.list().await
    }

    pub async fn get(&self, user_id: &str) -> AuthResult<User> {
        let user_id = parse_user_id(user_id)?;
        self.repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(&self, user_id: &str, input: UpdateUserInput) -> AuthResult<User> {
        let mut user = self.get(user_id).await?;

        if let Some(user_name) = present(input.user_name) {
            user.set_user_name(UserName::new(&user_name)?);
        }
        if let Some(email) = present(input.email) {
            user.set_email(Email::new(email)?);
        }
        if let Some(role) = present(input.role) {
            let role = UserRole::from_code(&role).ok_or_else(|| {
                AuthError::validation("Role must be either 'user' or 'admin'")
            })?;
            user.set_role(role);
        }
        if let Some(is_active) = input.is_active {
            user.set_active(is_active);
        }

        self.repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "User updated");
        Ok(user)
    }

    /// Delete `target`; an administrator cannot delete their own account
    pub async fn delete(&self, actor: &UserId, target: &str) -> AuthResult<()> {
        let target = parse_user_id(target)?;

        if *actor == target {
            return Err(AuthError::CannotDeleteSelf);
        }

        if !self.repo.delete(&target).await? {
            return Err(AuthError::UserNotFound);
        }

        self.mirror.forget_token(&target).await;

        tracing::info!(user_id = %target, deleted_by = %actor, "User deleted");
        Ok(())
    }
}

/// An id that cannot be parsed cannot name a user
fn parse_user_id(raw: &str) -> AuthResult<UserId> {
    raw.parse::<UserId>().map_err(|_| AuthError::UserNotFound)
}
