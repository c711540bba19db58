//! HTTP Handlers

use std::collections::HashMap;
use std::sync::Arc;

use auth::presentation::middleware::CurrentUser;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::envelope::Envelope;
use platform::cache::CacheStore;

use crate::application::{
    CreateImageInput, CreateImageUseCase, DeleteImageUseCase, GalleryCache, GalleryConfig,
    GetImageUseCase, ListCategoriesUseCase, ListImagesUseCase, UpdateImageInput,
    UpdateImageUseCase,
};
use crate::domain::image_host::{ImageHost, ImageUpload};
use crate::domain::repository::GalleryRepository;
use crate::error::{GalleryError, GalleryResult};
use crate::presentation::dto::{ItemResponse, ListParams, ListResponse};

/// Multipart field carrying the image file
pub const IMAGE_FIELD: &str = "image";

/// Shared state for gallery handlers
pub struct GalleryAppState<G, H, C> {
    pub repo: Arc<G>,
    pub host: Arc<H>,
    pub cache: GalleryCache<C>,
    pub config: Arc<GalleryConfig>,
}

impl<G, H, C> Clone for GalleryAppState<G, H, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            host: self.host.clone(),
            cache: self.cache.clone(),
            config: self.config.clone(),
        }
    }
}

impl<G, H, C> GalleryAppState<G, H, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, host: Arc<H>, cache: Arc<C>, config: GalleryConfig) -> Self {
        Self {
            repo,
            host,
            cache: GalleryCache::new(cache, config.cache_ttl),
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Reads
// ============================================================================

/// GET /api/gallery
pub async fn list_images<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
    Query(params): Query<ListParams>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let use_case = ListImagesUseCase::new(state.repo.clone(), state.cache.clone());

    let images = use_case
        .execute(&params.into())
        .await
        .map_err(|e| e.during("Error fetching gallery images"))?;

    Ok(Json(ListResponse::from(images)))
}

/// GET /api/gallery/categories
pub async fn list_categories<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let use_case = ListCategoriesUseCase::new(state.repo.clone(), state.cache.clone());

    let categories = use_case
        .execute()
        .await
        .map_err(|e| e.during("Error fetching categories"))?;

    Ok(Json(ListResponse::from(categories)))
}

/// GET /api/gallery/{id}
pub async fn get_image<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
    Path(image_id): Path<String>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let use_case = GetImageUseCase::new(state.repo.clone(), state.cache.clone());

    let image = use_case
        .execute(&image_id)
        .await
        .map_err(|e| e.during("Error fetching image"))?;

    Ok(Json(ItemResponse::from(image)))
}

// ============================================================================
// Writes (admin)
// ============================================================================

/// POST /api/gallery (multipart)
pub async fn create_image<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let mut form = ImageForm::read(multipart, &state.config).await?;

    let use_case = CreateImageUseCase::new(
        state.repo.clone(),
        state.host.clone(),
        state.cache.clone(),
    );

    let input = CreateImageInput {
        title: form.take("title"),
        category: form.take("category"),
        description: form.take("description"),
        display_order: form.take("displayOrder"),
        image: form.image,
        uploaded_by: Some(user.user_id),
    };

    let image = use_case
        .execute(input)
        .await
        .map_err(|e| e.during("Error adding image"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(image).with_message("Image added successfully")),
    ))
}

/// PUT /api/gallery/{id} (multipart, file optional)
pub async fn update_image<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
    Path(image_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let mut form = ImageForm::read(multipart, &state.config).await?;

    let use_case = UpdateImageUseCase::new(
        state.repo.clone(),
        state.host.clone(),
        state.cache.clone(),
    );

    let input = UpdateImageInput {
        title: form.take("title"),
        category: form.take("category"),
        description: form.take("description"),
        display_order: form.take("displayOrder"),
        is_active: form.take("isActive"),
        image: form.image,
    };

    let image = use_case
        .execute(&image_id, input)
        .await
        .map_err(|e| e.during("Error updating image"))?;

    Ok(Json(
        Envelope::ok(image).with_message("Image updated successfully"),
    ))
}

/// DELETE /api/gallery/{id}
pub async fn delete_image<G, H, C>(
    State(state): State<GalleryAppState<G, H, C>>,
    Path(image_id): Path<String>,
) -> GalleryResult<impl IntoResponse>
where
    G: GalleryRepository + Send + Sync + 'static,
    H: ImageHost + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    let use_case = DeleteImageUseCase::new(
        state.repo.clone(),
        state.host.clone(),
        state.cache.clone(),
    );

    use_case
        .execute(&image_id)
        .await
        .map_err(|e| e.during("Error deleting image"))?;

    Ok(Json(Envelope::message("Image deleted successfully")))
}

// ============================================================================
// Multipart
// ============================================================================

/// Text fields plus the optional image file of a multipart body
#[derive(Debug, Default)]
struct ImageForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl ImageForm {
    async fn read(
        multipart: Result<Multipart, MultipartRejection>,
        config: &GalleryConfig,
    ) -> GalleryResult<Self> {
        let mut multipart = multipart.map_err(|e| {
            tracing::debug!(error = %e, "Rejected multipart body");
            GalleryError::validation("Invalid multipart data")
        })?;

        let mut form = ImageForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, config))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == IMAGE_FIELD {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !content_type.starts_with("image/") {
                    return Err(GalleryError::validation("Only image files are allowed!"));
                }
                let file_name = field.file_name().map(str::to_string);

                let bytes = field.bytes().await.map_err(|e| multipart_error(e, config))?;
                if bytes.len() > config.max_upload_bytes {
                    return Err(GalleryError::PayloadTooLarge {
                        max_mb: config.max_upload_mb(),
                    });
                }

                form.image = Some(ImageUpload {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                });
            } else if field.file_name().is_none() {
                let value = field.text().await.map_err(|e| multipart_error(e, config))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Body-limit hits surface as 413, everything else as a malformed body
fn multipart_error(err: MultipartError, config: &GalleryConfig) -> GalleryError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return GalleryError::PayloadTooLarge {
            max_mb: config.max_upload_mb(),
        };
    }

    tracing::debug!(error = %err, "Failed to read multipart field");
    GalleryError::validation("Invalid multipart data")
}
