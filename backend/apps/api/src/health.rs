//! Liveness of the store, the cache and the image host

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use gallery::CloudinaryHost;
use gallery::domain::image_host::ImageHost;
use platform::cache::{CacheStore, RedisCache};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub cache: Arc<RedisCache>,
    pub host: Arc<CloudinaryHost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Probe {
    Connected,
    Disconnected,
    #[serde(rename = "not configured")]
    NotConfigured,
}

impl Probe {
    fn from_result<E: std::fmt::Display>(service: &'static str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Probe::Connected,
            Err(e) => {
                tracing::warn!(service, error = %e, "Health probe failed");
                Probe::Disconnected
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Services {
    pub postgres: Probe,
    pub redis: Probe,
    pub cloudinary: Probe,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub databases: Services,
}

impl HealthReport {
    /// `degraded` as soon as one service is not connected
    pub fn new(databases: Services) -> Self {
        let healthy = [databases.postgres, databases.redis, databases.cloudinary]
            .iter()
            .all(|p| *p == Probe::Connected);

        Self {
            status: if healthy { "healthy" } else { "degraded" },
            timestamp: Utc::now(),
            databases,
        }
    }
}

/// GET /api/health
pub async fn health(State(state): State<HealthState>) -> Json<HealthReport> {
    let postgres = Probe::from_result(
        "postgres",
        sqlx::query("SELECT 1").execute(&state.pool).await.map(|_| ()),
    );

    let redis = if state.cache.is_enabled() {
        Probe::from_result("redis", state.cache.ping().await)
    } else {
        Probe::NotConfigured
    };

    let cloudinary = if state.host.is_configured() {
        Probe::from_result("cloudinary", state.host.ping().await)
    } else {
        Probe::NotConfigured
    };

    Json(HealthReport::new(Services {
        postgres,
        redis,
        cloudinary,
    }))
}
