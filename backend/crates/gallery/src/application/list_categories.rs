//! List Categories Use Case

use std::sync::Arc;

use platform::cache::CacheStore;

use crate::application::cache::{CacheKey, Cached, GalleryCache};
use crate::domain::repository::GalleryRepository;
use crate::domain::value_object::category::Category;
use crate::error::GalleryResult;

pub struct ListCategoriesUseCase<G, C> {
    repo: Arc<G>,
    cache: GalleryCache<C>,
}

impl<G, C> ListCategoriesUseCase<G, C>
where
    G: GalleryRepository + Send + Sync + 'static,
    C: CacheStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<G>, cache: GalleryCache<C>) -> Self {
        Self { repo, cache }
    }

    /// Categories that currently have at least one active image
    pub async fn execute(&self) -> GalleryResult<Cached<Vec<Category>>> {
        if let Some(categories) = self.cache.get(&CacheKey::Categories).await {
            return Ok(Cached::hit(categories));
        }

        let seen = self.cache.generation().await;
        let categories = self.repo.active_categories().await?;

        if !categories.is_empty() {
            self.cache.put(&CacheKey::Categories, &categories, seen).await;
        }

        Ok(Cached::miss(categories))
    }
}
