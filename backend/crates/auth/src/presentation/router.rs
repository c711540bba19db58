//! Auth Router

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use platform::cache::{CacheStore, RedisCache};

use crate::application::config::AuthConfig;
use crate::domain::notifier::Notifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::infra::mailer::SmtpNotifier;
use crate::infra::postgres::PgUserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    OwnerRule, authenticate, optional_authenticate, require_role, require_self_or_role,
};

/// Create the Auth router with the PostgreSQL repository, Redis mirror and SMTP notifier
pub fn auth_router(
    repo: PgUserRepository,
    cache: Arc<RedisCache>,
    notifier: SmtpNotifier,
    config: AuthConfig,
) -> Router {
    let state = AuthAppState::new(Arc::new(repo), cache, Arc::new(notifier), config);
    auth_router_from_state(state)
}

/// Create a generic Auth router for any repository, cache and notifier
pub fn auth_router_generic<R, C, N>(repo: R, cache: Arc<C>, notifier: N, config: AuthConfig) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let state = AuthAppState::new(Arc::new(repo), cache, Arc::new(notifier), config);
    auth_router_from_state(state)
}

/// Build the router around an existing state (whose gate may also guard other routers)
pub fn auth_router_from_state<R, C, N>(state: AuthAppState<R, C, N>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let gate = state.gate();

    let public = Router::new()
        .route("/register", post(handlers::register::<R, C, N>))
        .route("/login", post(handlers::login::<R, C, N>))
        .route("/forgot-password", post(handlers::forgot_password::<R, C, N>))
        .route("/reset-password", post(handlers::reset_password::<R, C, N>))
        .route(
            "/verify-reset-token/{token}",
            get(handlers::verify_reset_token::<R, C, N>),
        );

    let logout = Router::new()
        .route("/logout", post(handlers::logout::<R, C, N>))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            optional_authenticate::<R>,
        ));

    let session = Router::new()
        .route("/me", get(handlers::me))
        .route("/verify", get(handlers::verify))
        .route("/change-password", post(handlers::change_password::<R, C, N>));

    let admin = Router::new()
        .route("/users", get(handlers::list_users::<R, C, N>))
        .route(
            "/users/{id}",
            put(handlers::update_user::<R, C, N>).delete(handlers::delete_user::<R, C, N>),
        )
        .route_layer(middleware::from_fn_with_state(UserRole::Admin, require_role));

    let self_or_admin = Router::new()
        .route("/users/{id}", get(handlers::get_user::<R, C, N>))
        .route_layer(middleware::from_fn_with_state(
            OwnerRule {
                role: UserRole::Admin,
                param: "id",
            },
            require_self_or_role,
        ));

    // authenticate is the outermost layer, so role checks see CurrentUser
    let protected = session
        .merge(admin)
        .merge(self_or_admin)
        .route_layer(middleware::from_fn_with_state(gate, authenticate::<R>));

    public.merge(logout).merge(protected).with_state(state)
}
