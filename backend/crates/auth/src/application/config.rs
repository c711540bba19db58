//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::duration::DEFAULT_LIFETIME;

use crate::domain::entity::credentials::LockoutPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "token";

/// Default frontend origin used in reset links
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: Vec<u8>,
    /// Lifetime encoded into issued tokens
    pub token_ttl: Duration,
    /// Session cookie attributes (its `max_age` is also the cache mirror TTL)
    pub cookie: CookieConfig,
    pub lockout: LockoutPolicy,
    /// Validity of a password reset token
    pub reset_token_ttl: Duration,
    /// Base URL of the frontend; reset links point at `{frontend_url}/reset-password`
    pub frontend_url: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            token_ttl: DEFAULT_LIFETIME,
            cookie: CookieConfig::for_environment(SESSION_COOKIE_NAME, true, DEFAULT_LIFETIME),
            lockout: LockoutPolicy::default(),
            reset_token_ttl: Duration::from_secs(60 * 60), // 1 hour
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret
    pub fn with_random_secret() -> Self {
        Self {
            jwt_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development (insecure, `SameSite=Lax` cookie)
    pub fn development() -> Self {
        Self {
            cookie: CookieConfig::for_environment(SESSION_COOKIE_NAME, false, DEFAULT_LIFETIME),
            ..Self::with_random_secret()
        }
    }

    /// Lifetime of the session cookie and of the `token:<id>` cache mirror
    pub fn cookie_lifetime(&self) -> Duration {
        self.cookie
            .max_age_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME)
    }

    /// Link sent in password reset mail
    pub fn reset_url(&self, token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
