//! Loading caller-supplied photos into inference-ready base64 images.
//!
//! Callers send either URLs to fetch or inline `data:` URLs. URL images are
//! tried first; inline images are only used when no URL image could be
//! loaded. Individual failures are skipped with a warning.

use std::time::Duration;

use base64::Engine;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use luthier_core::defaults::{FALLBACK_IMAGE_MEDIA_TYPE, IMAGE_FETCH_TIMEOUT_SECS, MAX_IMAGES};
use luthier_core::{Error, ImageContent, Result};

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:(image/\w+);base64,(.+)$").expect("data URL pattern is valid")
});

/// Parse a `data:image/<type>;base64,<payload>` string.
pub fn parse_data_url(s: &str) -> Option<ImageContent> {
    let caps = DATA_URL.captures(s.trim())?;
    Some(ImageContent {
        media_type: caps[1].to_string(),
        data: caps[2].to_string(),
    })
}

/// Choose a media type for fetched bytes: the server's `Content-Type` if it
/// names an image, else magic-byte sniffing, else JPEG.
pub fn resolve_media_type(content_type: Option<&str>, bytes: &[u8]) -> String {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        if essence.starts_with("image/") {
            return essence;
        }
    }
    match infer::get(bytes) {
        Some(kind) if kind.mime_type().starts_with("image/") => kind.mime_type().to_string(),
        _ => FALLBACK_IMAGE_MEDIA_TYPE.to_string(),
    }
}

/// Fetches and encodes caller photos.
#[derive(Clone)]
pub struct ImageLoader {
    client: Client,
    max_images: usize,
}

impl ImageLoader {
    /// Create a loader whose fetches time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            max_images: MAX_IMAGES,
        })
    }

    /// Create from environment variables (`IMAGE_FETCH_TIMEOUT`).
    pub fn from_env() -> Result<Self> {
        let timeout = std::env::var("IMAGE_FETCH_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(IMAGE_FETCH_TIMEOUT_SECS);
        Self::new(timeout)
    }

    /// Fetch one URL and base64-encode the body.
    pub async fn fetch(&self, url: &str) -> Result<ImageContent> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request(format!("{} returned {}", url, status)));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Request(format!("{} returned an empty body", url)));
        }

        Ok(ImageContent {
            media_type: resolve_media_type(content_type.as_deref(), &bytes),
            data: base64::engine::general_purpose::STANDARD.encode(&bytes),
        })
    }

    /// Load up to five images, URLs first, inline data URLs as the fallback.
    ///
    /// Returns an empty list when nothing could be loaded; the caller decides
    /// whether that is an error.
    pub async fn load(&self, urls: &[String], inline: &[String]) -> Vec<ImageContent> {
        let fetches = urls.iter().take(self.max_images).cloned().map(|url| async move {
            let result = self.fetch(&url).await;
            (url, result)
        });

        let mut images = Vec::new();
        for (url, result) in join_all(fetches).await {
            match result {
                Ok(image) => images.push(image),
                Err(e) => warn!(
                    subsystem = "inference",
                    component = "images",
                    url = %url,
                    error = %e,
                    "Skipping image that could not be fetched"
                ),
            }
        }

        if images.is_empty() {
            for (index, entry) in inline.iter().take(self.max_images).enumerate() {
                match parse_data_url(entry) {
                    Some(image) => images.push(image),
                    None => warn!(
                        subsystem = "inference",
                        component = "images",
                        index,
                        "Skipping inline image that is not a base64 image data URL"
                    ),
                }
            }
        }

        debug!(
            subsystem = "inference",
            component = "images",
            image_count = images.len(),
            "Images loaded"
        );
        images
    }
}
