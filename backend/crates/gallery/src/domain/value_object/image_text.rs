//! Title and description of a gallery image

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Trimmed, non-empty, at most 100 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let title = raw.as_ref().trim();

        if title.is_empty() {
            return Err(AppError::bad_request("Image title is required"));
        }
        if title.chars().count() > TITLE_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Title cannot exceed {TITLE_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(title.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trimmed, possibly empty, at most 500 characters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let description = raw.as_ref().trim();

        if description.chars().count() > DESCRIPTION_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Description cannot exceed {DESCRIPTION_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(description.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
