//! Presentation Layer
//!
//! HTTP handlers, DTOs and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::GalleryAppState;
pub use router::{gallery_router, gallery_router_generic};
