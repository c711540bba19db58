//! Create Image Use Case
//!
//! Upload first, persist second: a record never exists without its remote
//! object. If persisting fails the fresh upload is removed again.

use std::sync::Arc;

use auth::models::user_id::UserId;
use platform::best_effort;
use platform::cache::CacheStore;

use crate::application::cache::GalleryCache;
use crate::application::{parse_category, parse_display_order, present};
use crate::domain::entity::gallery_image::{GalleryImage, RemoteImage};
use crate::domain::image_host::{ImageHost, ImageUpload};
use crate::domain::repository::GalleryRepository;
use crate::domain::value_object::image_text::{Description, Title};
use crate::error::{GalleryError, GalleryResult};

pub struct CreateImageInput {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<String>,
    pub image: Option<ImageUpload>,
    pub uploaded_by: Option<UserId>,
}

pub struct CreateImageUseCase<G, H, C> {
    repo: Arc<G>,
    host: Arc<H>,
    cache: GalleryCache<C>,
}

impl<G, H, C> CreateImageUseCase<G, H, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, host: Arc<H>, cache: GalleryCache<C>) -> Self {
        Self { repo, host, cache }
    }

    pub async fn execute(&self, input: CreateImageInput) -> GalleryResult<GalleryImage> {
        let (Some(title), Some(category)) = (present(input.title), present(input.category)) else {
            return Err(GalleryError::validation("Title and category are required"));
        };
        let image = input
            .image
            .ok_or_else(|| GalleryError::validation("Image file is required"))?;

        let category = parse_category(&category)?;
        let title = Title::new(title)?;
        let description = Description::new(input.description.unwrap_or_default())?;
        let display_order = parse_display_order(input.display_order)?.unwrap_or(0);

        let remote = upload(self.host.as_ref(), image).await?;
        let public_id = remote.public_id.clone();

        let image = GalleryImage::new(
            title,
            category,
            description,
            display_order,
            remote,
            input.uploaded_by,
        );

        if let Err(e) = self.repo.create(&image).await {
            best_effort::attempt("image_host.destroy_orphan", self.host.destroy(&public_id)).await;
            return Err(e);
        }

        self.cache.invalidate().await;

        tracing::info!(
            image_id = %image.image_id,
            category = %image.category,
            "Gallery image added"
        );

        Ok(image)
    }
}

/// Upload `image` and derive its delivery URLs
pub(crate) async fn upload<H>(host: &H, image: ImageUpload) -> GalleryResult<RemoteImage>
where
    H: ImageHost + Send + Sync,
{
    let uploaded = host.upload(image).await.map_err(GalleryError::Upload)?;
    let thumbnail_url = host.thumbnail_url(&uploaded.public_id);

    Ok(RemoteImage {
        url: uploaded.url,
        public_id: uploaded.public_id,
        thumbnail_url,
    })
}
