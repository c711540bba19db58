//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use kernel::envelope::Envelope;
use platform::cache::CacheStore;
use platform::cookie::{delete_cookie_header, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::token::{IssuedSession, TokenService};
use crate::application::{
    ChangePasswordInput, ChangePasswordUseCase, ForgotPasswordUseCase, LoginInput, LoginUseCase,
    LogoutUseCase, ManageUsersUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput,
    ResetPasswordUseCase, UpdateUserInput, VerifyResetTokenUseCase,
};
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::error::AuthResult;
use crate::infra::session_cache::SessionMirror;
use crate::presentation::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, SessionResponse, UpdateUserRequest, UserData, UserListResponse,
    UserResponse,
};
use crate::presentation::middleware::{AuthGate, CurrentUser};

/// Shared state for auth handlers
pub struct AuthAppState<R, C, N> {
    pub repo: Arc<R>,
    pub mirror: SessionMirror<C>,
    pub notifier: Arc<N>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AuthConfig>,
}

impl<R, C, N> Clone for AuthAppState<R, C, N> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mirror: self.mirror.clone(),
            notifier: self.notifier.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R, C, N> AuthAppState<R, C, N>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, cache: Arc<C>, notifier: Arc<N>, config: AuthConfig) -> Self {
        let mirror = SessionMirror::new(cache, config.cookie_lifetime(), config.reset_token_ttl);
        let tokens = Arc::new(TokenService::from_config(&config));

        Self {
            repo,
            mirror,
            notifier,
            tokens,
            config: Arc::new(config),
        }
    }

    /// Gate sharing this state's repository and signing key
    pub fn gate(&self) -> AuthGate<R> {
        AuthGate::new(
            self.repo.clone(),
            self.tokens.clone(),
            self.config.cookie.name.as_str(),
        )
    }
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.mirror.clone(),
        state.notifier.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        user_name: req.username,
        email: req.email,
        password: req.password,
        requested_role: req.role,
    };

    let session = use_case
        .execute(input)
        .await
        .map_err(|e| e.during("Registration failed"))?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&state.config, &session.token))],
        Json(session_envelope(session, "User registered successfully")),
    ))
}

/// POST /api/auth/login
pub async fn login<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.mirror.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let session = use_case
        .execute(input)
        .await
        .map_err(|e| e.during("Login failed"))?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&state.config, &session.token))],
        Json(session_envelope(session, "Login successful")),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds; the cookie is cleared even without a valid session.
pub async fn logout<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    current: Option<CurrentUser>,
) -> impl IntoResponse
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.mirror.clone());
    use_case
        .execute(current.as_ref().map(|CurrentUser(user)| &user.user_id))
        .await;

    (
        [(header::SET_COOKIE, delete_cookie_header(&state.config.cookie))],
        Json(Envelope::message("Logout successful")),
    )
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<Envelope<UserData>> {
    Json(Envelope::ok(UserData::from(&user)))
}

/// GET /api/auth/verify
pub async fn verify(CurrentUser(user): CurrentUser) -> Json<Envelope<UserData>> {
    Json(Envelope::ok(UserData::from(&user)).with_message("Token is valid"))
}

/// POST /api/auth/change-password
pub async fn change_password<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<Json<Envelope<()>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());

    let input = ChangePasswordInput {
        current_password: req.current_password,
        new_password: req.new_password,
    };

    use_case
        .execute(&user.user_id, input)
        .await
        .map_err(|e| e.during("Error changing password"))?;

    Ok(Json(Envelope::message("Password changed successfully")))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<Envelope<()>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.mirror.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    use_case
        .execute(req.email)
        .await
        .map_err(|e| e.during("Error processing password reset request"))?;

    Ok(Json(Envelope::message(
        "If an account with that email exists, a password reset link has been sent.",
    )))
}

/// GET /api/auth/verify-reset-token/{token}
pub async fn verify_reset_token<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Path(token): Path<String>,
) -> AuthResult<Json<Envelope<()>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = VerifyResetTokenUseCase::new(state.repo.clone());

    use_case
        .execute(&token)
        .await
        .map_err(|e| e.during("Error verifying token"))?;

    Ok(Json(Envelope::message("Token is valid")))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(
        state.repo.clone(),
        state.mirror.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = ResetPasswordInput {
        token: req.token,
        password: req.password,
    };

    let session = use_case
        .execute(input)
        .await
        .map_err(|e| e.during("Error resetting password"))?;

    Ok((
        [(header::SET_COOKIE, session_cookie(&state.config, &session.token))],
        Json(session_envelope(
            session,
            "Password reset successfully. You are now logged in.",
        )),
    ))
}

// ============================================================================
// User Administration
// ============================================================================

/// GET /api/auth/users
pub async fn list_users<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
) -> AuthResult<Json<Envelope<UserListResponse>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let users = manage_users(&state)
        .list()
        .await
        .map_err(|e| e.during("Failed to get users"))?;

    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    let count = users.len();

    Ok(Json(Envelope::ok(UserListResponse { users, count })))
}

/// GET /api/auth/users/{id}
pub async fn get_user<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Path(id): Path<String>,
) -> AuthResult<Json<Envelope<UserData>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let user = manage_users(&state)
        .get(&id)
        .await
        .map_err(|e| e.during("Failed to get user information"))?;

    Ok(Json(Envelope::ok(UserData::from(&user))))
}

/// PUT /api/auth/users/{id}
pub async fn update_user<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AuthResult<Json<Envelope<UserData>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let input = UpdateUserInput {
        user_name: req.username,
        email: req.email,
        role: req.role,
        is_active: req.is_active,
    };

    let user = manage_users(&state)
        .update(&id, input)
        .await
        .map_err(|e| e.during("Failed to update user"))?;

    Ok(Json(
        Envelope::ok(UserData::from(&user)).with_message("User updated successfully"),
    ))
}

/// DELETE /api/auth/users/{id}
pub async fn delete_user<R, C, N>(
    State(state): State<AuthAppState<R, C, N>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> AuthResult<Json<Envelope<()>>>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    manage_users(&state)
        .delete(&actor.user_id, &id)
        .await
        .map_err(|e| e.during("Failed to delete user"))?;

    Ok(Json(Envelope::message("User deleted successfully")))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn manage_users<R, C, N>(state: &AuthAppState<R, C, N>) -> ManageUsersUseCase<R, C>
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    ManageUsersUseCase::new(state.repo.clone(), state.mirror.clone())
}

fn session_cookie(config: &AuthConfig, token: &str) -> HeaderValue {
    set_cookie_header(&config.cookie, token)
}

fn session_envelope(
    session: IssuedSession,
    message: &'static str,
) -> Envelope<SessionResponse> {
    Envelope::ok(SessionResponse {
        user: UserResponse::from(&session.user),
        token: session.token,
    })
    .with_message(message)
}

