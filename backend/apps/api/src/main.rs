//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use auth::presentation::{AuthAppState, auth_router_from_state};
use auth::{PgUserRepository, SmtpNotifier};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use gallery::{CloudinaryHost, PgGalleryRepository, gallery_router};
use platform::cache::RedisCache;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::health::HealthState;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,gallery=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Optional integrations: each one degrades to "disabled" when unconfigured
    let cache = Arc::new(match &config.redis_url {
        Some(url) => RedisCache::new(url)?,
        None => {
            tracing::warn!("Redis not configured, caching disabled");
            RedisCache::disabled()
        }
    });

    let notifier = match &config.mail {
        Some(settings) => SmtpNotifier::new(settings)?,
        None => {
            tracing::warn!("Email not configured, notifications disabled");
            SmtpNotifier::disabled()
        }
    };

    let image_host = match config.cloudinary.clone() {
        Some(settings) => CloudinaryHost::new(settings, config.gallery.folder.clone()),
        None => {
            tracing::warn!("Cloudinary not configured, uploads will fail");
            CloudinaryHost::disabled()
        }
    };

    // One user store and signing key for the auth routes and the gallery gate
    let auth_state = AuthAppState::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        cache.clone(),
        Arc::new(notifier),
        config.auth.clone(),
    );
    let gate = auth_state.gate();

    let health_state = HealthState {
        pool: pool.clone(),
        cache: cache.clone(),
        host: Arc::new(image_host.clone()),
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .route("/", get(root))
        .route(
            "/api/health",
            get(health::health).with_state(health_state),
        )
        .nest("/api/auth", auth_router_from_state(auth_state))
        .nest(
            "/api/gallery",
            gallery_router(
                PgGalleryRepository::new(pool.clone()),
                image_host,
                cache,
                gate,
                config.gallery.clone(),
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(production = config.production, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Entrepreneur Portfolio API is running!",
        "status": "success",
    }))
}
