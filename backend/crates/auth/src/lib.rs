//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository and notifier traits
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL, SMTP and cache-mirror implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration (the first account becomes the administrator) and e-mail login
//! - Stateless HS256 session tokens delivered as cookie and in the response body
//! - Failed-attempt lockout
//! - Password reset by e-mailed single-use link, password change
//! - User administration for administrators
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Reset tokens are stored only as SHA-256 digests
//! - Lockout and reset consumption are single SQL statements

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{mailer::SmtpNotifier, postgres::PgUserRepository};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgUserRepository as UserStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
