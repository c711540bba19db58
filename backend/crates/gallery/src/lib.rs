//! Gallery Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Image entity, categories, repository and image host traits
//! - `application/` - Use cases and the read cache
//! - `infra/` - PostgreSQL and Cloudinary implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Public listing by category and activity, single image, active categories
//! - Read-through cache; every write clears all `gallery:*` keys
//! - Administrator upload, partial update (optional file replacement), delete
//!
//! Files are uploaded to the image host before any record is written.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::GalleryConfig;
pub use error::{GalleryError, GalleryResult};
pub use infra::{
    cloudinary::{CloudinaryHost, CloudinarySettings},
    postgres::PgGalleryRepository,
};
pub use presentation::router::gallery_router;

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
