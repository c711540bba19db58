//! Get Image Use Case

use std::sync::Arc;

use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, Cached, GalleryCache};
use crate::domain::entity::gallery_image::GalleryImage;
use crate::domain::repository::GalleryRepository;
use crate::domain::value_object::image_id::ImageId;
use crate::error::{GalleryError, GalleryResult};

pub struct GetImageUseCase<G, C> {
    repo: Arc<G>,
    cache: GalleryCache<C>,
}

impl<G, C> GetImageUseCase<G, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, cache: GalleryCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self, image_id: &str) -> GalleryResult<Cached<GalleryImage>> {
        let image_id = parse_image_id(image_id)?;
        let key = CacheKey::Image(image_id);

        if let Some(image) = self.cache.get(&key).await {
            return Ok(Cached::hit(image));
        }

        let seen = self.cache.generation().await;
        let image = self
            .repo
            .find_by_id(&image_id)
            .await?
            .ok_or(GalleryError::NotFound)?;

        self.cache.put(&key, &image, seen).await;

        Ok(Cached::miss(image))
    }
}

/// An id that cannot be parsed cannot name an image
pub(crate) fn parse_image_id(raw: &str) -> GalleryResult<ImageId> {
    raw.parse::<ImageId>().map_err(|_| GalleryError::NotFound)
}
