//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::cache::Cached;
use crate::application::list_images::ListImagesQuery;

/// `GET /api/gallery?category=&active=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub active: Option<String>,
}

impl From<ListParams> for ListImagesQuery {
    fn from(params: ListParams) -> Self {
        ListImagesQuery {
            category: params.category,
            active: params.active,
        }
    }
}

/// Read response for collections
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub success: bool,
    pub from_cache: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> From<Cached<Vec<T>>> for ListResponse<T> {
    fn from(cached: Cached<Vec<T>>) -> Self {
        Self {
            success: true,
            from_cache: cached.from_cache,
            count: cached.value.len(),
            data: cached.value,
        }
    }
}

/// Read response for a single item
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse<T> {
    pub success: bool,
    pub from_cache: bool,
    pub data: T,
}

impl<T> From<Cached<T>> for ItemResponse<T> {
    fn from(cached: Cached<T>) -> Self {
        Self {
            success: true,
            from_cache: cached.from_cache,
            data: cached.value,
        }
    }
}
