//! Gemini `generateContent` client.
//!
//! One request carries the prompt as a text part and the image as an
//! `inlineData` part. The reply's text parts from the first candidate are
//! concatenated and returned untouched; JSON extraction happens upstream.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pipeline::{InlineImage, ModelName, ReviewError, VisionModel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::snippet;

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiVisionClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model to call, e.g. `gemini-2.5-flash`.
    pub model: ModelName,
    /// API root without a trailing slash.
    pub base_url: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// [`VisionModel`] backed by Gemini.
#[derive(Debug, Clone)]
pub struct GeminiVisionClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiVisionClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client that shares `http`'s connection pool.
    pub fn with_client(http: Client, mut config: GeminiConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        Self { http, config }
    }

    /// The model every request is sent to.
    pub fn model(&self) -> &ModelName {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, self.config.model)
    }
}

#[async_trait]
impl VisionModel for GeminiVisionClient {
    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn describe(&self, prompt: &str, image: &InlineImage) -> Result<String, ReviewError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    RequestPart::Text { text: prompt },
                    RequestPart::InlineData {
                        inline_data: Blob {
                            mime_type: &image.mime_type,
                            data: STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReviewError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ReviewError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ReviewError::Transport(format!("{status}: {}", snippet(&body))));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ReviewError::Model(format!("unreadable response body: {e}")))?;
        let text = parsed.into_text()?;
        debug!(length = text.len(), "model response received");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, ReviewError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ReviewError::Model(format!("prompt blocked: {reason}")));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ReviewError::Model("no candidates".into()))?;
        let finish_reason = candidate.finish_reason;
        let text: String = candidate
            .content
            .into_iter()
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            let reason = finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(ReviewError::Model(format!("no text in response (finish reason {reason})")));
        }
        Ok(text)
    }
}
