//! Auth Middleware
//!
//! - [`authenticate`]: requires a valid token, attaches [`CurrentUser`]
//! - [`optional_authenticate`]: attaches [`CurrentUser`] when possible, never blocks
//! - [`require_role`] / [`require_self_or_role`]: authorization on top of `authenticate`
//!
//! Token source priority: the session cookie, then `Authorization: Bearer`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Path, Request, State};
use axum::http::{HeaderMap, header, request::Parts};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::authenticate::AuthenticateUseCase;
use crate::application::token::TokenService;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Resolves request credentials to a user
pub struct AuthGate<R> {
    authenticate: AuthenticateUseCase<R>,
    cookie_name: Arc<str>,
}

impl<R> Clone for AuthGate<R> {
    fn clone(&self) -> Self {
        Self {
            authenticate: self.authenticate.clone(),
            cookie_name: self.cookie_name.clone(),
        }
    }
}

impl<R> AuthGate<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>, cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            authenticate: AuthenticateUseCase::new(repo, tokens),
            cookie_name: cookie_name.into(),
        }
    }

    /// Cookie first, then bearer header
    pub fn token_from(&self, headers: &HeaderMap) -> Option<String> {
        platform::cookie::extract_cookie(headers, &self.cookie_name).or_else(|| bearer_token(headers))
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> AuthResult<User> {
        let token = self.token_from(headers);
        self.authenticate.execute(token.as_deref()).await
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Middleware that requires a valid token for an active user
pub async fn authenticate<R>(
    State(gate): State<AuthGate<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = gate.resolve(req.headers()).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Middleware that attaches the user if the request carries a usable token
pub async fn optional_authenticate<R>(
    State(gate): State<AuthGate<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
{
    if gate.token_from(req.headers()).is_some() {
        match gate.resolve(req.headers()).await {
            Ok(user) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => tracing::debug!(error = %e, "Optional authentication skipped"),
        }
    }

    next.run(req).await
}

/// Middleware that requires the attached user to hold `role`
pub async fn require_role(
    State(role): State<UserRole>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::NotAuthenticated)?;

    if user.0.user_role != role {
        return Err(AuthError::Forbidden(denied_message(role)));
    }

    Ok(next.run(req).await)
}

/// Role that may act on any resource, and the path parameter naming the owner
#[derive(Debug, Clone, Copy)]
pub struct OwnerRule {
    pub role: UserRole,
    pub param: &'static str,
}

/// Middleware that passes holders of `rule.role` and the owner named by the path
pub async fn require_self_or_role(
    State(rule): State<OwnerRule>,
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::NotAuthenticated)?;

    let is_owner = params
        .get(rule.param)
        .is_some_and(|id| *id == user.0.user_id.to_string());

    if user.0.user_role != rule.role && !is_owner {
        return Err(AuthError::Forbidden("Access denied"));
    }

    Ok(next.run(req).await)
}

fn denied_message(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Admin access required",
        UserRole::User => "Access denied",
    }
}
