//! Gallery Image Entity
//!
//! Serialized as-is to clients and into the read cache, so the serde shape
//! is the wire shape (`_id`, camelCase).

use auth::models::user_id::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{
    category::Category,
    image_id::ImageId,
    image_text::{Description, Title},
};

/// Remote object backing an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    /// Canonical delivery URL
    pub url: String,
    /// Host-side object id, needed for delete and transforms
    pub public_id: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub image_id: ImageId,
    pub title: Title,
    pub category: Category,
    pub description: Description,
    pub image_url: String,
    pub cloudinary_url: String,
    pub cloudinary_public_id: String,
    pub thumbnail_url: String,
    /// Ascending sort key
    pub display_order: i32,
    pub is_active: bool,
    pub uploaded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryImage {
    /// New, active image for an already uploaded remote object
    pub fn new(
        title: Title,
        category: Category,
        description: Description,
        display_order: i32,
        remote: RemoteImage,
        uploaded_by: Option<UserId>,
    ) -> Self {
        let now = Utc::now();

        Self {
            image_id: ImageId::new(),
            title,
            category,
            description,
            image_url: remote.url.clone(),
            cloudinary_url: remote.url,
            cloudinary_public_id: remote.public_id,
            thumbnail_url: remote.thumbnail_url,
            display_order,
            is_active: true,
            uploaded_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point at a new remote object, returning the public id of the old one
    pub fn replace_remote(&mut self, remote: RemoteImage) -> String {
        self.image_url = remote.url.clone();
        self.cloudinary_url = remote.url;
        self.thumbnail_url = remote.thumbnail_url;
        self.touch();
        std::mem::replace(&mut self.cloudinary_public_id, remote.public_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str) -> RemoteImage {
        RemoteImage {
            url: format!("https://img.example/{id}.jpg"),
            public_id: id.to_string(),
            thumbnail_url: format!("https://img.example/thumb/{id}.webp"),
        }
    }

    #[test]
    fn test_new_image_defaults() {
        let image = GalleryImage::new(
            Title::new("Keynote").unwrap(),
            Category::Events,
            Description::default(),
            0,
            remote("a1"),
            None,
        );

        assert!(image.is_active);
        assert_eq!(image.image_url, image.cloudinary_url);

        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["_id"], image.image_id.to_string());
        assert_eq!(json["cloudinaryPublicId"], "a1");
        assert_eq!(json["displayOrder"], 0);
        assert_eq!(json["category"], "Events");
    }

    #[test]
    fn test_replace_remote_returns_old_id() {
        let mut image = GalleryImage::new(
            Title::new("Keynote").unwrap(),
            Category::Events,
            Description::default(),
            0,
            remote("old"),
            None,
        );

        let old = image.replace_remote(remote("new"));
        assert_eq!(old, "old");
        assert_eq!(image.cloudinary_public_id, "new");
        assert_eq!(image.image_url, "https://img.example/new.jpg");
    }
}
