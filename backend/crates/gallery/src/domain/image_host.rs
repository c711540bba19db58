//! Remote image host

use thiserror::Error;

/// Image bytes received from a client
#[derive(Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: String,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Image host is not configured")]
    NotConfigured,

    /// Transport failure or unreadable response
    #[error("Image host request failed: {0}")]
    Request(String),

    /// The host answered with an error
    #[error("Image host rejected the request: {0}")]
    Rejected(String),
}

#[trait_variant::make(ImageHost: Send)]
pub trait LocalImageHost {
    /// Upload into the configured folder with the delivery transformation applied
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, HostError>;

    async fn destroy(&self, public_id: &str) -> Result<(), HostError>;

    /// Derived 400x300 webp thumbnail URL
    fn thumbnail_url(&self, public_id: &str) -> String;

    /// Credentials check for the health probe
    async fn ping(&self) -> Result<(), HostError>;
}
