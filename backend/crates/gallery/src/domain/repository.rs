//! Repository Traits

use crate::domain::entity::gallery_image::GalleryImage;
use crate::domain::value_object::{category::Category, image_id::ImageId};
use crate::error::GalleryResult;

/// Listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category: Option<Category>,
    pub active_only: bool,
}

#[trait_variant::make(GalleryRepository: Send)]
pub trait LocalGalleryRepository {
    /// Matching images ordered by `display_order` ascending, newest first within a tie
    async fn list(&self, filter: &ListFilter) -> GalleryResult<Vec<GalleryImage>>;

    async fn find_by_id(&self, image_id: &ImageId) -> GalleryResult<Option<GalleryImage>>;

    /// Distinct categories of active images, sorted by name
    async fn active_categories(&self) -> GalleryResult<Vec<Category>>;

    async fn create(&self, image: &GalleryImage) -> GalleryResult<()>;

    /// Returns `false` when the image no longer exists
    async fn update(&self, image: &GalleryImage) -> GalleryResult<bool>;

    /// Returns `false` when the image did not exist
    async fn delete(&self, image_id: &ImageId) -> GalleryResult<bool>;
}
