//! Update Image Use Case
//!
//! Partial update. A new file is uploaded before anything else changes; the
//! old remote object is removed (best effort) only once the record points at
//! the new one.

use std::sync::Arc;

use platform::best_effort;
use platform::cache::CacheStore;

use crate::application::cache::GalleryCache;
use crate::application::create_image::upload;
use crate::application::get_image::parse_image_id;
use crate::application::{parse_category, parse_display_order, present};
use crate::domain::entity::gallery_image::GalleryImage;
use crate::domain::image_host::{ImageHost, ImageUpload};
use crate::domain::repository::GalleryRepository;
use crate::domain::value_object::image_text::{Description, Title};
use crate::error::{GalleryError, GalleryResult};

#[derive(Default)]
pub struct UpdateImageInput {
    pub title: Option<String>,
    pub category: Option<String>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    pub display_order: Option<String>,
    pub is_active: Option<String>,
    pub image: Option<ImageUpload>,
}

pub struct UpdateImageUseCase<G, H, C> {
    repo: Arc<G>,
    host: Arc<H>,
    cache: GalleryCache<C>,
}

impl<G, H, C> UpdateImageUseCase<G, H, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, host: Arc<H>, cache: GalleryCache<C>) -> Self {
        Self { repo, host, cache }
    }

    pub async fn execute(&self, image_id: &str, input: UpdateImageInput) -> GalleryResult<GalleryImage> {
        let image_id = parse_image_id(image_id)?;

        let mut image = self
            .repo
            .find_by_id(&image_id)
            .await?
            .ok_or(GalleryError::NotFound)?;

        if let Some(title) = present(input.title) {
            image.title = Title::new(title)?;
        }
        if let Some(category) = present(input.category) {
            image.category = parse_category(&category)?;
        }
        if let Some(description) = input.description {
            image.description = Description::new(description)?;
        }
        if let Some(display_order) = parse_display_order(input.display_order)? {
            image.display_order = display_order;
        }
        if let Some(is_active) = present(input.is_active) {
            image.is_active = parse_flag(&is_active)?;
        }
        image.touch();

        let replaced = match input.image {
            Some(file) => {
                let remote = upload(self.host.as_ref(), file).await?;
                Some(image.replace_remote(remote))
            }
            None => None,
        };

        if !self.repo.update(&image).await? {
            if replaced.is_some() {
                best_effort::attempt(
                    "image_host.destroy_orphan",
                    self.host.destroy(&image.cloudinary_public_id),
                )
                .await;
            }
            return Err(GalleryError::NotFound);
        }

        if let Some(old_public_id) = replaced {
            best_effort::attempt("image_host.destroy_replaced", self.host.destroy(&old_public_id))
                .await;
        }

        self.cache.invalidate().await;

        tracing::info!(image_id = %image.image_id, "Gallery image updated");

        Ok(image)
    }
}

fn parse_flag(value: &str) -> GalleryResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(GalleryError::validation("isActive must be true or false")),
    }
}
