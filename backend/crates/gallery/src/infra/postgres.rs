//! PostgreSQL Repository Implementation

use auth::models::user_id::UserId;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::gallery_image::GalleryImage;
use crate::domain::repository::{GalleryRepository, ListFilter};
use crate::domain::value_object::{
    category::Category,
    image_id::ImageId,
    image_text::{Description, Title},
};
use crate::error::{GalleryError, GalleryResult};

const SELECT_COLUMNS: &str = r#"
    SELECT
        image_id,
        title,
        category,
        description,
        image_url,
        cloudinary_url,
        cloudinary_public_id,
        thumbnail_url,
        display_order,
        is_active,
        uploaded_by,
        created_at,
        updated_at
    FROM gallery_images
"#;

/// PostgreSQL-backed gallery repository
#[derive(Clone)]
pub struct PgGalleryRepository {
    pool: PgPool,
}

impl PgGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GalleryRepository for PgGalleryRepository {
    async fn list(&self, filter: &ListFilter) -> GalleryResult<Vec<GalleryImage>> {
        // NULL parameters disable the corresponding condition
        let sql = format!(
            r#"{SELECT_COLUMNS}
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND (NOT $2 OR is_active)
            ORDER BY display_order ASC, created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, ImageRow>(&sql)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.active_only)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ImageRow::into_image).collect()
    }

    async fn find_by_id(&self, image_id: &ImageId) -> GalleryResult<Option<GalleryImage>> {
        let sql = format!("{SELECT_COLUMNS} WHERE image_id = $1");

        let row = sqlx::query_as::<_, ImageRow>(&sql)
            .bind(image_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ImageRow::into_image).transpose()
    }

    async fn active_categories(&self) -> GalleryResult<Vec<Category>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM gallery_images WHERE is_active ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        names.iter().map(|name| parse_stored_category(name)).collect()
    }

    async fn create(&self, image: &GalleryImage) -> GalleryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO gallery_images (
                image_id,
                title,
                category,
                description,
                image_url,
                cloudinary_url,
                cloudinary_public_id,
                thumbnail_url,
                display_order,
                is_active,
                uploaded_by,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(image.image_id.as_uuid())
        .bind(image.title.as_str())
        .bind(image.category.as_str())
        .bind(image.description.as_str())
        .bind(&image.image_url)
        .bind(&image.cloudinary_url)
        .bind(&image.cloudinary_public_id)
        .bind(&image.thumbnail_url)
        .bind(image.display_order)
        .bind(image.is_active)
        .bind(image.uploaded_by.map(UserId::into_uuid))
        .bind(image.created_at)
        .bind(image.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, image: &GalleryImage) -> GalleryResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE gallery_images SET
                title = $2,
                category = $3,
                description = $4,
                image_url = $5,
                cloudinary_url = $6,
                cloudinary_public_id = $7,
                thumbnail_url = $8,
                display_order = $9,
                is_active = $10,
                updated_at = $11
            WHERE image_id = $1
            "#,
        )
        .bind(image.image_id.as_uuid())
        .bind(image.title.as_str())
        .bind(image.category.as_str())
        .bind(image.description.as_str())
        .bind(&image.image_url)
        .bind(&image.cloudinary_url)
        .bind(&image.cloudinary_public_id)
        .bind(&image.thumbnail_url)
        .bind(image.display_order)
        .bind(image.is_active)
        .bind(image.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, image_id: &ImageId) -> GalleryResult<bool> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE image_id = $1")
            .bind(image_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn parse_stored_category(name: &str) -> GalleryResult<Category> {
    Category::parse(name)
        .ok_or_else(|| GalleryError::Internal(format!("Invalid category: {name}")))
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    image_id: Uuid,
    title: String,
    category: String,
    description: String,
    image_url: String,
    cloudinary_url: String,
    cloudinary_public_id: String,
    thumbnail_url: String,
    display_order: i32,
    is_active: bool,
    uploaded_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ImageRow {
    fn into_image(self) -> GalleryResult<GalleryImage> {
        Ok(GalleryImage {
            image_id: ImageId::from_uuid(self.image_id),
            title: Title::from_db(self.title),
            category: parse_stored_category(&self.category)?,
            description: Description::from_db(self.description),
            image_url: self.image_url,
            cloudinary_url: self.cloudinary_url,
            cloudinary_public_id: self.cloudinary_public_id,
            thumbnail_url: self.thumbnail_url,
            display_order: self.display_order,
            is_active: self.is_active,
            uploaded_by: self.uploaded_by.map(UserId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
