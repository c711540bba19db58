//! Authenticate Use Case
//!
//! Resolves a bearer/cookie token to a live, active user.

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct AuthenticateUseCase<R> {
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> Clone for AuthenticateUseCase<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<R> AuthenticateUseCase<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, token: Option<&str>) -> AuthResult<User> {
        let token = token.ok_or(AuthError::MissingToken)?;

        let user_id = self.tokens.verify(token)?;

        let user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(user)
    }
}
