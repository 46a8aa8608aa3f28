//! Shared value types for the review domain.
//!
//! [`SeoFields`] is the five-field metadata record every review produces.
//! Its length contracts live on [`SeoField`] so the normaliser, the
//! validator, and the prompt template all read the same numbers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ContentError;
use crate::CollectionName;

/// Untyped YAML frontmatter of a content file, in file order.
///
/// The site's frontmatter schema is owned by the static-site generator; this
/// crate only reads the handful of keys it needs and merges review output
/// back in.
pub type Frontmatter = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Field contracts
// ---------------------------------------------------------------------------

/// Maximum length of [`SeoFields::title`], in characters.
pub const TITLE_MAX: usize = 50;
/// Minimum length of [`SeoFields::description`], in characters.
pub const DESCRIPTION_MIN: usize = 140;
/// Maximum length of [`SeoFields::description`], in characters.
pub const DESCRIPTION_MAX: usize = 160;
/// Maximum length of [`SeoFields::pinterest_title`], in characters.
pub const PINTEREST_TITLE_MAX: usize = 80;
/// Minimum length of [`SeoFields::pinterest_description`], in characters.
pub const PINTEREST_DESCRIPTION_MIN: usize = 200;
/// Maximum length of [`SeoFields::pinterest_description`], in characters.
pub const PINTEREST_DESCRIPTION_MAX: usize = 300;

/// Inclusive length bounds for one field. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    /// Smallest accepted length.
    pub min: Option<usize>,
    /// Largest accepted length.
    pub max: Option<usize>,
}

impl LengthBounds {
    /// Returns `true` if `len` lies within the bounds.
    pub fn contains(self, len: usize) -> bool {
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }
}

/// One of the five review output fields.
///
/// The declaration order is the validation order; `Ord` follows it so maps
/// keyed by field iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoField {
    /// Page title.
    Title,
    /// Meta description.
    Description,
    /// Pin title.
    PinterestTitle,
    /// Pin description.
    PinterestDescription,
    /// Literal alt-text description of the image.
    Prompt,
}

impl SeoField {
    /// All fields in validation order.
    pub const ALL: [SeoField; 5] = [
        SeoField::Title,
        SeoField::Description,
        SeoField::PinterestTitle,
        SeoField::PinterestDescription,
        SeoField::Prompt,
    ];

    /// The field's key in model output and in frontmatter.
    pub fn as_str(self) -> &'static str {
        match self {
            SeoField::Title => "title",
            SeoField::Description => "description",
            SeoField::PinterestTitle => "pinterest_title",
            SeoField::PinterestDescription => "pinterest_description",
            SeoField::Prompt => "prompt",
        }
    }

    /// Length contract for the field. Every field must also be non-empty.
    pub fn bounds(self) -> LengthBounds {
        let (min, max) = match self {
            SeoField::Title => (None, Some(TITLE_MAX)),
            SeoField::Description => (Some(DESCRIPTION_MIN), Some(DESCRIPTION_MAX)),
            SeoField::PinterestTitle => (None, Some(PINTEREST_TITLE_MAX)),
            SeoField::PinterestDescription => {
                (Some(PINTEREST_DESCRIPTION_MIN), Some(PINTEREST_DESCRIPTION_MAX))
            }
            SeoField::Prompt => (Some(1), None),
        };
        LengthBounds { min, max }
    }
}

impl std::fmt::Display for SeoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Review records
// ---------------------------------------------------------------------------

/// SEO metadata for one coloring page.
///
/// Values returned by the reviewer have passed validation; values built by
/// hand or by [`crate::seo::coerce`] carry no such guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoFields {
    /// At most 50 characters.
    pub title: String,
    /// Between 140 and 160 characters.
    pub description: String,
    /// At most 80 characters.
    pub pinterest_title: String,
    /// Between 200 and 300 characters.
    pub pinterest_description: String,
    /// One or two sentences.
    pub prompt: String,
}

impl SeoFields {
    /// Returns the value of `field`.
    pub fn get(&self, field: SeoField) -> &str {
        match field {
            SeoField::Title => &self.title,
            SeoField::Description => &self.description,
            SeoField::PinterestTitle => &self.pinterest_title,
            SeoField::PinterestDescription => &self.pinterest_description,
            SeoField::Prompt => &self.prompt,
        }
    }
}

/// Default art style when a page's frontmatter does not declare one.
pub const DEFAULT_STYLE: &str = "Kawaii";
/// Default medium when a page's frontmatter does not declare one.
pub const DEFAULT_MEDIUM: &str = "Markers";

/// Everything the reviewer needs to describe one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    /// Publicly fetchable URL of the page image.
    pub image_url: String,
    /// What the page depicts (usually the collection subject, e.g. `"cats"`).
    pub subject: String,
    /// Art style (e.g. `"Kawaii"`).
    pub style: String,
    /// Suggested coloring medium (e.g. `"Markers"`).
    pub medium: String,
    /// Prompt the image was generated from, when known.
    pub original_prompt: Option<String>,
}

impl ReviewInput {
    /// Derives review input from a content file's frontmatter.
    ///
    /// The image comes from `image_url`, falling back to `r2_original`. The
    /// subject is the first entry of `collections` (or its scalar value),
    /// falling back to the collection name.
    pub fn from_entry(
        entry: &ContentEntry,
        collection: &CollectionName,
    ) -> Result<Self, ContentError> {
        let fm = &entry.frontmatter;

        let image_url = non_empty_str(fm.get("image_url"))
            .or_else(|| non_empty_str(fm.get("r2_original")))
            .ok_or_else(|| ContentError::MissingImageUrl {
                path: entry.path.clone(),
            })?;

        let subject = match fm.get("collections") {
            Some(Value::Array(items)) => non_empty_str(items.first()),
            other => non_empty_str(other),
        }
        .unwrap_or_else(|| collection.as_str().to_string());

        Ok(Self {
            image_url,
            subject,
            style: non_empty_str(fm.get("style")).unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            medium: non_empty_str(fm.get("medium")).unwrap_or_else(|| DEFAULT_MEDIUM.to_string()),
            original_prompt: fm.get("prompt").and_then(Value::as_str).map(str::to_string),
        })
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Image bytes ready to be sent inline to a vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type, e.g. `"image/png"`.
    pub mime_type: String,
    /// Raw (not base64-encoded) image bytes.
    pub bytes: Vec<u8>,
}

/// One Markdown content file with its parsed frontmatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    /// Absolute or root-relative path of the file.
    pub path: PathBuf,
    /// File name including the `.md` extension.
    pub file_name: String,
    /// Parsed YAML frontmatter; empty if the file has none.
    pub frontmatter: Frontmatter,
    /// Markdown body following the frontmatter block.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
