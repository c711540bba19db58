//! List Images Use Case

use std::sync::Arc;

use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, Cached, GalleryCache};
use crate::domain::entity::gallery_image::GalleryImage;
use crate::domain::repository::{GalleryRepository, ListFilter};
use crate::domain::value_object::category::Category;
use crate::error::GalleryResult;

/// Raw query parameters (`?category=&active=`)
#[derive(Debug, Clone, Default)]
pub struct ListImagesQuery {
    pub category: Option<String>,
    pub active: Option<String>,
}

/// Outcome of interpreting the query parameters
enum Selection {
    Filter(ListFilter),
    /// A category outside the closed set matches nothing
    Nothing,
}

impl ListImagesQuery {
    fn selection(&self) -> Selection {
        let active_only = self.active.as_deref() == Some("true");

        match self.category.as_deref() {
            None | Some("") | Some("All") => Selection::Filter(ListFilter {
                category: None,
                active_only,
            }),
            Some(name) => match Category::parse(name) {
                Some(category) => Selection::Filter(ListFilter {
                    category: Some(category),
                    active_only,
                }),
                None => Selection::Nothing,
            },
        }
    }
}

pub struct ListImagesUseCase<G, C> {
    repo: Arc<G>,
    cache: GalleryCache<C>,
}

impl<G, C> ListImagesUseCase<G, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, cache: GalleryCache<C>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self, query: &ListImagesQuery) -> GalleryResult<Cached<Vec<GalleryImage>>> {
        let filter = match query.selection() {
            Selection::Filter(filter) => filter,
            Selection::Nothing => return Ok(Cached::miss(Vec::new())),
        };
        let key = CacheKey::for_listing(&filter);

        if let Some(images) = self.cache.get(&key).await {
            return Ok(Cached::hit(images));
        }

        let seen = self.cache.generation().await;
        let images = self.repo.list(&filter).await?;

        // Empty results are not cached
        if !images.is_empty() {
            self.cache.put(&key, &images, seen).await;
        }

        Ok(Cached::miss(images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(category: Option<&str>, active: Option<&str>) -> Option<ListFilter> {
        let query = ListImagesQuery {
            category: category.map(str::to_string),
            active: active.map(str::to_string),
        };
        match query.selection() {
            Selection::Filter(filter) => Some(filter),
            Selection::Nothing => None,
        }
    }

    #[test]
    fn test_query_interpretation() {
        assert_eq!(filter(None, None), Some(ListFilter::default()));
        assert_eq!(filter(Some("All"), Some("true")).unwrap().category, None);
        assert!(filter(Some("All"), Some("true")).unwrap().active_only);
        assert!(!filter(None, Some("1")).unwrap().active_only);
        assert_eq!(
            filter(Some("Events"), None).unwrap().category,
            Some(Category::Events)
        );
        assert_eq!(filter(Some("Parties"), None), None);
    }
}
