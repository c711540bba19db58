//! Application Configuration

use std::time::Duration;

/// Remote folder that receives gallery uploads
pub const DEFAULT_FOLDER: &str = "entrepreneur-portfolio/gallery";

/// Largest accepted image file
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Lifetime of cached read results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub folder: String,
    pub max_upload_bytes: usize,
    pub cache_ttl: Duration,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl GalleryConfig {
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_bytes / (1024 * 1024)
    }
}
