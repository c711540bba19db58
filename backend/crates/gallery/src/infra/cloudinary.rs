//! Cloudinary Image Host
//!
//! Signed upload/destroy calls against the Cloudinary REST API. Signatures
//! are SHA-1 over the sorted, `&`-joined parameters followed by the secret.

use std::time::Duration;

use chrono::Utc;
use platform::crypto::sha1_hex;
use reqwest::{Client, Response, multipart};
use serde::Deserialize;

use crate::domain::image_host::{HostError, ImageHost, ImageUpload, UploadedImage};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Applied at upload: fit within 1200x800, automatic quality
const UPLOAD_TRANSFORMATION: &str = "c_limit,h_800,q_auto,w_1200";

/// Delivery transformation for thumbnails (400x300 fill, webp)
const THUMBNAIL_TRANSFORMATION: &str = "c_fill,h_300,q_auto,w_400";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinarySettings {
    /// All three values present and non-blank, else `None`
    pub fn from_parts(
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Some(Self {
            cloud_name: present(cloud_name)?,
            api_key: present(api_key)?,
            api_secret: present(api_secret)?,
        })
    }
}

impl std::fmt::Debug for CloudinarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinarySettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct CloudinaryHost {
    client: Client,
    settings: Option<CloudinarySettings>,
    folder: String,
}

impl CloudinaryHost {
    pub fn new(settings: CloudinarySettings, folder: impl Into<String>) -> Self {
        Self::build(Some(settings), folder.into())
    }

    /// Host without credentials: every remote call fails with `NotConfigured`
    pub fn disabled() -> Self {
        Self::build(None, String::new())
    }

    fn build(settings: Option<CloudinarySettings>, folder: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            settings,
            folder,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    fn settings(&self) -> Result<&CloudinarySettings, HostError> {
        self.settings.as_ref().ok_or(HostError::NotConfigured)
    }
}

/// SHA-1 over `k=v` pairs sorted by key, joined by `&`, secret appended
fn sign(params: &mut [(&str, String)], api_secret: &str) -> String {
    params.sort_by(|a, b| a.0.cmp(b.0));

    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    sha1_hex(format!("{joined}{api_secret}").as_bytes())
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Non-2xx answers carry `{"error":{"message":...}}`
async fn rejected(response: Response) -> HostError {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => HostError::Rejected(body.error.message),
        Err(_) => HostError::Rejected(format!("HTTP {status}")),
    }
}

fn transport(err: reqwest::Error) -> HostError {
    HostError::Request(err.to_string())
}

impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, HostError> {
        let settings = self.settings()?;
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = [
            ("folder", self.folder.clone()),
            ("timestamp", timestamp.clone()),
            ("transformation", UPLOAD_TRANSFORMATION.to_string()),
        ];
        let signature = sign(&mut params, &settings.api_secret);

        let file = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()))
            .mime_str(&image.content_type)
            .map_err(transport)?;

        let form = multipart::Form::new()
            .part("file", file)
            .text("api_key", settings.api_key.clone())
            .text("folder", self.folder.clone())
            .text("timestamp", timestamp)
            .text("transformation", UPLOAD_TRANSFORMATION)
            .text("signature", signature);

        let response = self
            .client
            .post(format!("{API_BASE}/{}/image/upload", settings.cloud_name))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let body: UploadResponse = response.json().await.map_err(transport)?;

        tracing::debug!(public_id = %body.public_id, "Image uploaded");

        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), HostError> {
        let settings = self.settings()?;
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.clone()),
        ];
        let signature = sign(&mut params, &settings.api_secret);

        let response = self
            .client
            .post(format!("{API_BASE}/{}/image/destroy", settings.cloud_name))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", settings.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let body: DestroyResponse = response.json().await.map_err(transport)?;
        if body.result != "ok" {
            return Err(HostError::Rejected(format!(
                "destroy {public_id}: {}",
                body.result
            )));
        }

        Ok(())
    }

    fn thumbnail_url(&self, public_id: &str) -> String {
        let cloud_name = self
            .settings
            .as_ref()
            .map(|s| s.cloud_name.as_str())
            .unwrap_or_default();

        format!("{DELIVERY_BASE}/{cloud_name}/image/upload/{THUMBNAIL_TRANSFORMATION}/{public_id}.webp")
    }

    async fn ping(&self) -> Result<(), HostError> {
        let settings = self.settings()?;

        let response = self
            .client
            .get(format!("{API_BASE}/{}/ping", settings.cloud_name))
            .basic_auth(&settings.api_key, Some(&settings.api_secret))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        Ok(())
    }
}
