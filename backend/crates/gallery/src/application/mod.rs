//! Application Layer

pub mod cache;
pub mod config;
pub mod create_image;
pub mod delete_image;
pub mod get_image;
pub mod list_categories;
pub mod list_images;
pub mod update_image;

pub use cache::{CacheKey, Cached, GalleryCache};
pub use config::GalleryConfig;
pub use create_image::{CreateImageInput, CreateImageUseCase};
pub use delete_image::DeleteImageUseCase;
pub use get_image::GetImageUseCase;
pub use list_categories::ListCategoriesUseCase;
pub use list_images::{ListImagesQuery, ListImagesUseCase};
pub use update_image::{UpdateImageInput, UpdateImageUseCase};

use crate::domain::value_object::category::Category;
use crate::error::{GalleryError, GalleryResult};

/// Blank form fields count as absent
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_category(raw: &str) -> GalleryResult<Category> {
    Category::parse(raw.trim()).ok_or_else(|| {
        GalleryError::validation(format!(
            "Invalid category. Must be one of: {}",
            Category::names()
        ))
    })
}

/// `None` when absent or blank
pub(crate) fn parse_display_order(raw: Option<String>) -> GalleryResult<Option<i32>> {
    match present(raw) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GalleryError::validation("Display order must be an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_order_parsing() {
        assert_eq!(parse_display_order(None).unwrap(), None);
        assert_eq!(parse_display_order(Some(" ".into())).unwrap(), None);
        assert_eq!(parse_display_order(Some("-3".into())).unwrap(), Some(-3));
        assert!(parse_display_order(Some("first".into())).is_err());
    }

    #[test]
    fn test_category_message_lists_choices() {
        let err = parse_category("Parties").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid category. Must be one of: Business, Networking, Recognition, Events, Awards, Other"
        );
    }
}
