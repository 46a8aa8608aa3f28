//! Error types for the review domain.
//!
//! [`ReviewError`] covers everything that can stop one image review. Its
//! [`SeoValidationError`] variant carries per-field diagnostics so callers
//! can show exactly which length contract was missed.
//!
//! [`ContentError`] is produced by [`crate::ports::ContentStore`]
//! implementations and by frontmatter-derived input. [`PolicyError`] is
//! produced when a retry policy or limiter is built from invalid numbers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::SeoField;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One violated length contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Length of the offending value, in characters.
    pub actual_length: usize,
    /// Minimum the value had to reach, if the field has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    /// Maximum the value had to stay under, if the field has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "length {}", self.actual_length)?;
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, " (min {min}, max {max})"),
            (Some(min), None) => write!(f, " (min {min})"),
            (None, Some(max)) => write!(f, " (max {max})"),
            (None, None) => Ok(()),
        }
    }
}

/// Review output still broke one or more field contracts after auto-fix.
///
/// `details` holds every violation, not only the first, and iterates in
/// validation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoValidationError {
    /// Summary line.
    pub message: String,
    /// Violations keyed by field.
    pub details: BTreeMap<SeoField, FieldViolation>,
}

impl SeoValidationError {
    /// Returns `true` if `field` is among the violations.
    pub fn has_field(&self, field: SeoField) -> bool {
        self.details.contains_key(&field)
    }
}

impl std::fmt::Display for SeoValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        for (i, (field, violation)) in self.details.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{field} {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SeoValidationError {}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Errors produced while reviewing one image.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The page image could not be downloaded. Fatal for the review; never
    /// retried with a corrective prompt.
    #[error("Failed to fetch image ({status}): {body}")]
    ImageFetch {
        /// HTTP status code, or 0 when no response was received.
        status: u16,
        /// Response body snippet, or the transport error text.
        body: String,
    },

    /// The model endpoint was unreachable or answered with a failure status.
    #[error("Vision model request failed: {0}")]
    Transport(String),

    /// The model answered but the answer was unusable (e.g. no text parts).
    #[error("Vision model returned an unusable response: {0}")]
    Model(String),

    /// The model output contained no JSON object.
    #[error("Model did not return JSON.")]
    NoJson,

    /// The model output looked like JSON but did not parse.
    #[error("Model returned malformed JSON: {0}")]
    InvalidJson(String),

    /// The parsed output broke one or more field contracts.
    #[error(transparent)]
    Validation(#[from] SeoValidationError),
}

impl ReviewError {
    /// Whether a re-prompt with a corrective instruction may fix this failure.
    ///
    /// Everything except a failed image download qualifies.
    pub fn is_correctable(&self) -> bool {
        !matches!(self, ReviewError::ImageFetch { .. })
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Errors produced by content stores and frontmatter-derived input.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The content file does not exist.
    #[error("Content file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading or writing the file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The frontmatter block is not a YAML mapping.
    #[error("Malformed frontmatter in {}: {reason}", path.display())]
    MalformedFrontmatter {
        /// File being parsed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Neither `image_url` nor `r2_original` is set, so there is nothing to review.
    #[error("Missing image_url and r2_original in frontmatter of {}", path.display())]
    MissingImageUrl {
        /// File being reviewed.
        path: PathBuf,
    },

    /// A generation manifest could not be read.
    #[error("Invalid manifest {}: {reason}", path.display())]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Reason it was rejected.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// A retry policy or limiter was configured with out-of-range numbers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// `max_attempts` must be at least 1.
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// `backoff_multiplier` must be finite and at least 1.
    #[error("backoff_multiplier must be a finite number >= 1, got {0}")]
    InvalidMultiplier(f64),

    /// `max_concurrent` must be at least 1.
    #[error("max_concurrent must be at least 1")]
    ZeroConcurrency,
}
