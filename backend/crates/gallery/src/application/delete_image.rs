//! Delete Image Use Case

use std::sync::Arc;

use platform::best_effort;
use platform::cache::CacheStore;

use crate::application::cache::GalleryCache;
use crate::application::get_image::parse_image_id;
use crate::domain::image_host::ImageHost;
use crate::domain::repository::GalleryRepository;
use crate::error::{GalleryError, GalleryResult};

pub struct DeleteImageUseCase<G, H, C> {
    repo: Arc<G>,
    host: Arc<H>,
    cache: GalleryCache<C>,
}

impl<G, H, C> DeleteImageUseCase<G, H, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, host: Arc<H>, cache: GalleryCache<C>) -> Self {
        Self { repo, host, cache }
    }

    /// Remove the record; a remote object that cannot be destroyed is only logged
    pub async fn execute(&self, image_id: &str) -> GalleryResult<()> {
        let image_id = parse_image_id(image_id)?;

        let image = self
            .repo
            .find_by_id(&image_id)
            .await?
            .ok_or(GalleryError::NotFound)?;

        best_effort::attempt(
            "image_host.destroy",
            self.host.destroy(&image.cloudinary_public_id),
        )
        .await;

        if !self.repo.delete(&image_id).await? {
            return Err(GalleryError::NotFound);
        }

        self.cache.invalidate().await;

        tracing::info!(image_id = %image_id, "Gallery image deleted");

        Ok(())
    }
}
