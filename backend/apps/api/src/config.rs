//! Process configuration
//!
//! Everything is read from the environment (after `.env` is loaded). Optional
//! integrations (Redis, Cloudinary, SMTP) are simply disabled when their
//! variables are absent.

use std::time::Duration;

use anyhow::{Context, bail};
use auth::config::{AuthConfig, SESSION_COOKIE_NAME};
use auth::infra::mailer::MailSettings;
use auth::models::credentials::LockoutPolicy;
use gallery::{CloudinarySettings, GalleryConfig};
use platform::cookie::CookieConfig;
use platform::duration::{DEFAULT_LIFETIME, lifetime_or_default, parse_lifetime};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_REDIS_PORT: &str = "6379";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub production: bool,
    pub database_url: String,
    /// CORS allow-list: `FRONTEND_URL` followed by `FRONTEND_ORIGINS`
    pub allowed_origins: Vec<String>,
    /// `None` disables the cache
    pub redis_url: Option<String>,
    pub cloudinary: Option<CloudinarySettings>,
    pub mail: Option<MailSettings>,
    pub auth: AuthConfig,
    pub gallery: GalleryConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = var("NODE_ENV")
            .or_else(|| var("APP_ENV"))
            .is_some_and(|env| env.eq_ignore_ascii_case("production"));

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let frontend_url = var("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());
        let mut allowed_origins = vec![frontend_url.clone()];
        if let Some(extra) = var("FRONTEND_ORIGINS") {
            allowed_origins.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty() && *o != frontend_url)
                    .map(str::to_string),
            );
        }

        let token_ttl = token_lifetime(var("JWT_EXPIRE").or_else(|| var("JWT_EXPIRES_IN")).as_deref());
        let cookie_lifetime = lifetime_or_default(var("JWT_COOKIE_EXPIRE").as_deref());

        let mut lockout = LockoutPolicy::default();
        if let Some(raw) = var("LOGIN_MAX_ATTEMPTS") {
            lockout.max_attempts = raw
                .trim()
                .parse()
                .with_context(|| format!("LOGIN_MAX_ATTEMPTS is not a number: {raw}"))?;
            if lockout.max_attempts == 0 {
                bail!("LOGIN_MAX_ATTEMPTS must be at least 1");
            }
        }
        if let Some(raw) = var("LOGIN_LOCK_MINUTES") {
            let minutes: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("LOGIN_LOCK_MINUTES is not a number: {raw}"))?;
            lockout.lock_duration = chrono::Duration::minutes(minutes);
        }

        let auth = AuthConfig {
            jwt_secret: jwt_secret.into_bytes(),
            token_ttl,
            cookie: CookieConfig::for_environment(SESSION_COOKIE_NAME, production, cookie_lifetime),
            lockout,
            frontend_url: frontend_url.clone(),
            ..AuthConfig::default()
        };

        let redis_url = var("UPSTASH_REDIS_URL").or_else(|| {
            let host = var("REDIS_HOST")?;
            let port = var("REDIS_PORT").unwrap_or_else(|| DEFAULT_REDIS_PORT.to_string());
            Some(match var("REDIS_PASSWORD") {
                Some(password) => format!("redis://:{password}@{host}:{port}"),
                None => format!("redis://{host}:{port}"),
            })
        });

        let cloudinary = CloudinarySettings::from_parts(
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        );

        let mail = match (var("EMAIL_USER"), var("EMAIL_PASSWORD")) {
            (Some(user), Some(password)) => Some(MailSettings {
                host: var("EMAIL_HOST").unwrap_or_else(|| {
                    MailSettings::host_for_service(&var("EMAIL_SERVICE").unwrap_or_default())
                }),
                user,
                password,
                from_name: var("EMAIL_FROM_NAME"),
                frontend_url: frontend_url.clone(),
            }),
            _ => None,
        };

        Ok(Self {
            port,
            production,
            database_url,
            allowed_origins,
            redis_url,
            cloudinary,
            mail,
            auth,
            gallery: GalleryConfig::default(),
        })
    }
}

/// Token lifetime: `<integer><d|h|m|s>`, or a bare number of seconds
fn token_lifetime(raw: Option<&str>) -> Duration {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_LIFETIME;
    };

    match raw.parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => parse_lifetime(raw).unwrap_or(DEFAULT_LIFETIME),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/portfolio"),
        ("JWT_SECRET", "s3cret"),
    ];

    #[test]
    fn test_defaults() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.port, 5000);
        assert!(!config.production);
        assert!(!config.auth.cookie.secure);
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.auth.token_ttl, DEFAULT_LIFETIME);
        assert_eq!(config.auth.lockout.max_attempts, 5);
        assert!(config.redis_url.is_none());
        assert!(config.cloudinary.is_none());
        assert!(config.mail.is_none());
    }

    #[test]
    fn test_required_variables() {
        let err = config(&[("JWT_SECRET", "x")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = config(&[("DATABASE_URL", "postgres://x")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_production_and_lifetimes() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("NODE_ENV", "production"),
            ("JWT_EXPIRES_IN", "3600"),
            ("JWT_COOKIE_EXPIRE", "12h"),
            ("LOGIN_LOCK_MINUTES", "30"),
        ]);
        let config = config(&vars).unwrap();

        assert!(config.auth.cookie.secure);
        assert_eq!(config.auth.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.auth.cookie_lifetime(), Duration::from_secs(12 * 3600));
        assert_eq!(config.auth.lockout.lock_duration, chrono::Duration::minutes(30));
    }

    #[test]
    fn test_integrations() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("REDIS_HOST", "cache"),
            ("REDIS_PASSWORD", "pw"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
            ("EMAIL_USER", "me@example.com"),
            ("EMAIL_PASSWORD", "app-password"),
            ("FRONTEND_ORIGINS", "https://a.example, https://b.example"),
        ]);
        let config = config(&vars).unwrap();

        assert_eq!(config.redis_url.as_deref(), Some("redis://:pw@cache:6379"));
        assert_eq!(config.cloudinary.unwrap().cloud_name, "demo");
        assert_eq!(config.mail.unwrap().host, "smtp.gmail.com");
        assert_eq!(config.allowed_origins.len(), 3);
    }

    #[test]
    fn test_upstash_url_wins() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("UPSTASH_REDIS_URL", "rediss://default:t@eu1.upstash.io:6379"),
            ("REDIS_HOST", "ignored"),
        ]);
        let config = config(&vars).unwrap();
        assert_eq!(
            config.redis_url.as_deref(),
            Some("rediss://default:t@eu1.upstash.io:6379")
        );
    }

    #[test]
    fn test_token_lifetime_grammar() {
        assert_eq!(token_lifetime(Some("2d")), Duration::from_secs(2 * 86400));
        assert_eq!(token_lifetime(Some("90")), Duration::from_secs(90));
        assert_eq!(token_lifetime(Some("soon")), DEFAULT_LIFETIME);
        assert_eq!(token_lifetime(None), DEFAULT_LIFETIME);
    }
}
