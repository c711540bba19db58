//! Gallery Router

use std::sync::Arc;

use auth::PgUserRepository;
use auth::domain::repository::UserRepository;
use auth::models::user_role::UserRole;
use auth::presentation::middleware::{
    AuthGate, authenticate, optional_authenticate, require_role,
};
use axum::extract::DefaultBodyLimit;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use platform::cache::{CacheStore, RedisCache};

use crate::application::config::GalleryConfig;
use crate::domain::image_host::ImageHost;
use crate::domain::repository::GalleryRepository;
use crate::infra::cloudinary::CloudinaryHost;
use crate::infra::postgres::PgGalleryRepository;
use crate::presentation::handlers::{self, GalleryAppState};

/// Headroom for the text fields next to the file
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the Gallery router with PostgreSQL, Cloudinary and Redis
pub fn gallery_router(
    repo: PgGalleryRepository,
    host: CloudinaryHost,
    cache: Arc<RedisCache>,
    gate: AuthGate<PgUserRepository>,
    config: GalleryConfig,
) -> Router {
    gallery_router_generic(repo, host, cache, gate, config)
}

/// Create a generic Gallery router for any repository, image host and cache
pub fn gallery_router_generic<G, H, C, R>(
    repo: G,
    host: H,
    cache: Arc<C>,
    gate: AuthGate<R>,
    config: GalleryConfig,
) -> Router
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
    R: UserRepository + Send + Sync + 'static,
{
    let body_limit = config.max_upload_bytes + FORM_OVERHEAD_BYTES;
    let state = GalleryAppState::new(Arc::new(repo), Arc::new(host), cache, config);

    let reads = Router::new()
        .route("/", get(handlers::list_images::<G, H, C>))
        .route("/categories", get(handlers::list_categories::<G, H, C>))
        .route("/{id}", get(handlers::get_image::<G, H, C>))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            optional_authenticate::<R>,
        ));

    // authenticate is the outermost layer, so the role check sees CurrentUser
    let writes = Router::new()
        .route("/", post(handlers::create_image::<G, H, C>))
        .route(
            "/{id}",
            put(handlers::update_image::<G, H, C>)
                .delete(handlers::delete_image::<G, H, C>),
        )
        .route_layer(middleware::from_fn_with_state(UserRole::Admin, require_role))
        .route_layer(middleware::from_fn_with_state(gate, authenticate::<R>))
        .layer(DefaultBodyLimit::max(body_limit));

    reads.merge(writes).with_state(state)
}
