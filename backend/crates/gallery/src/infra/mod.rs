//! Infrastructure Layer
//!
//! Database and image host adapters.

pub mod cloudinary;
pub mod postgres;

pub use cloudinary::{CloudinaryHost, CloudinarySettings};
pub use postgres::PgGalleryRepository;
