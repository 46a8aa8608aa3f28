//! Page image download over HTTP.

use async_trait::async_trait;
use pipeline::{ImageSource, InlineImage, ReviewError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::snippet;

/// MIME type assumed when neither the response nor the URL says otherwise.
const FALLBACK_MIME_TYPE: &str = "image/png";

/// Fetches images with a plain `GET`.
#[derive(Debug, Clone, Default)]
pub struct HttpImageSource {
    http: Client,
}

impl HttpImageSource {
    /// Creates a source with a default client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<InlineImage, ReviewError> {
        let response = self.http.get(url).send().await.map_err(|e| ReviewError::ImageFetch {
            status: 0,
            body: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = match snippet(&body) {
                s if s.is_empty() => status.canonical_reason().unwrap_or_default().to_string(),
                s => s,
            };
            return Err(ReviewError::ImageFetch {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| ReviewError::ImageFetch {
            status: status.as_u16(),
            body: e.to_string(),
        })?;

        let mime_type = infer_mime_type(content_type.as_deref(), url);
        debug!(%mime_type, bytes = bytes.len(), "image downloaded");
        Ok(InlineImage {
            mime_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Best-effort MIME type for a downloaded image.
///
/// An `image/*` content type wins (parameters stripped). Otherwise the URL
/// suffix decides between JPEG and WebP, and anything else is PNG.
pub fn infer_mime_type(content_type: Option<&str>, url: &str) -> String {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or_default().trim();
        if essence.starts_with("image/") {
            return essence.to_string();
        }
    }

    let url = url.to_ascii_lowercase();
    if url.ends_with(".jpg") || url.ends_with(".jpeg") {
        "image/jpeg".to_string()
    } else if url.ends_with(".webp") {
        "image/webp".to_string()
    } else {
        FALLBACK_MIME_TYPE.to_string()
    }
}
