//! Port traits implemented by infrastructure crates.
//!
//! The orchestration layer (`nodes`) depends only on these traits. The
//! `llm` crate supplies [`ImageSource`] and [`VisionModel`] over HTTP; the
//! `content` crate supplies [`ContentStore`] over the file system.
//!
//! None of these calls carry a timeout. A caller that needs a deadline races
//! the returned future against a timer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::errors::{ContentError, ReviewError};
use crate::{Category, CollectionName, ContentEntry, InlineImage, SeoFields};

/// Downloads page images.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Fetches the image at `url`.
    ///
    /// Fails with [`ReviewError::ImageFetch`] when the resource can not be
    /// retrieved; the error carries the HTTP status and a body snippet.
    async fn fetch(&self, url: &str) -> Result<InlineImage, ReviewError>;
}

/// A multimodal model that answers a text prompt about one inline image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Sends `prompt` together with `image` and returns the model's raw text.
    async fn describe(&self, prompt: &str, image: &InlineImage) -> Result<String, ReviewError>;
}

/// Markdown content files addressed by category and collection.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Lists the page paths of a collection, excluding its `_index.md`,
    /// sorted by file name. A missing collection yields an empty list.
    ///
    /// Pages are not parsed here, so one broken page never hides the others;
    /// it fails later in [`read`](Self::read).
    async fn list(
        &self,
        category: &Category,
        collection: &CollectionName,
    ) -> Result<Vec<PathBuf>, ContentError>;

    /// Resolves a page file name inside a collection to its path.
    fn page_path(
        &self,
        category: &Category,
        collection: &CollectionName,
        file_name: &str,
    ) -> PathBuf;

    /// Reads and parses one content file.
    async fn read(&self, path: &Path) -> Result<ContentEntry, ContentError>;

    /// Merges `fields` into the file's frontmatter and rewrites it, keeping
    /// the body. Any `tags` key is dropped.
    async fn update_frontmatter(&self, path: &Path, fields: &SeoFields) -> Result<(), ContentError>;
}
