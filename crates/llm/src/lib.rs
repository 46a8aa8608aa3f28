//! PaperPause vision provider adapter.
//!
//! Implements [`pipeline::ImageSource`] with [`HttpImageSource`] and
//! [`pipeline::VisionModel`] with [`GeminiVisionClient`], which speaks the
//! Gemini `generateContent` REST API. Other providers are added as new
//! `VisionModel` impls in this crate without touching `pipeline` or `nodes`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response
//! parsing live here. Retrying is not this crate's concern: wrap the client
//! in `nodes::ModelGateway` for that.

pub mod gemini;
pub mod image;

pub use gemini::{GeminiConfig, GeminiVisionClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use image::{infer_mime_type, HttpImageSource};

/// Longest error-body excerpt carried into an error message, in chars.
const BODY_SNIPPET_CHARS: usize = 500;

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
