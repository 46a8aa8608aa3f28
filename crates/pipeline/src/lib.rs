//! Core review domain for the PaperPause content pipeline.
//!
//! This crate holds every domain concept used when reviewing a coloring
//! page's SEO metadata: the five-field [`SeoFields`] record and its length
//! contracts, the text-shaping and validation rules that coerce model output
//! into those contracts, the prompt template, and the port traits that
//! infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Category`, `CollectionName`, `BatchRunId`, etc.) |
//! | [`types`] | Value types (`SeoFields`, `ReviewInput`, `ContentEntry`, etc.) |
//! | [`errors`] | Review, content, and policy error types |
//! | [`text`] | Sentence- and word-boundary truncation |
//! | [`seo`] | JSON extraction, coercion, auto-fix, validation |
//! | [`prompt`] | Prompt template and corrective instruction |
//! | [`ports`] | `ImageSource`, `VisionModel`, `ContentStore` traits |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod prompt;
pub mod seo;
pub mod text;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ContentError, FieldViolation, PolicyError, ReviewError, SeoValidationError};
pub use identifiers::{BatchRunId, Category, CollectionName, ModelName};
pub use ports::{ContentStore, ImageSource, VisionModel};
pub use prompt::PromptTemplate;
pub use types::{
    ContentEntry, Frontmatter, InlineImage, LengthBounds, ReviewInput, SeoField, SeoFields,
    Timestamp,
};
