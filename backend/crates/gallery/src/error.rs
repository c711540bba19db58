//! Gallery Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::classify_sqlx, kind::ErrorKind};
use thiserror::Error;

use crate::domain::image_host::HostError;

pub type GalleryResult<T> = Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Unknown or unparsable image id
    #[error("Image not found")]
    NotFound,

    #[error("File too large. Maximum size is {max_mb}MB")]
    PayloadTooLarge { max_mb: usize },

    /// Upload to the image host failed; nothing was persisted
    #[error("Failed to upload image to Cloudinary")]
    Upload(#[source] HostError),

    /// Unexpected failure while performing a named operation
    #[error("{operation}")]
    Failed {
        operation: &'static str,
        detail: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GalleryError {
    pub fn validation(message: impl Into<String>) -> Self {
        GalleryError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GalleryError::Validation(_) => ErrorKind::BadRequest,
            GalleryError::NotFound => ErrorKind::NotFound,
            GalleryError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            GalleryError::Database(e) => classify_sqlx(e).0,
            GalleryError::Upload(_) | GalleryError::Failed { .. } | GalleryError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Attach the failing operation to unexpected (5xx) errors
    pub fn during(self, operation: &'static str) -> Self {
        match self {
            GalleryError::Upload(_) | GalleryError::Failed { .. } => self,
            e if e.kind().is_server_error() => GalleryError::Failed {
                operation,
                detail: e.to_string(),
            },
            e => e,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            GalleryError::Failed { operation, detail } => {
                AppError::internal(*operation).with_detail(detail.clone())
            }
            GalleryError::Upload(e) => AppError::internal(self.to_string()).with_detail(e.to_string()),
            GalleryError::Database(e) => AppError::new(self.kind(), classify_sqlx(e).1),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            GalleryError::Database(e) => {
                tracing::error!(error = %e, "Gallery database error");
            }
            GalleryError::Upload(e) => {
                tracing::error!(error = %e, "Image upload failed");
            }
            GalleryError::Failed { operation, detail } => {
                tracing::error!(operation, detail = %detail, "Gallery operation failed");
            }
            GalleryError::Internal(msg) => {
                tracing::error!(message = %msg, "Gallery internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Gallery error");
            }
        }
    }
}

impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

/// Value-object failures: client errors become `Validation`, the rest `Internal`
impl From<AppError> for GalleryError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            GalleryError::Validation(err.message().to_string())
        } else {
            GalleryError::Internal(err.to_string())
        }
    }
}
