//! [`ContentStore`] over the local file system.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pipeline::{Category, CollectionName, ContentEntry, ContentError, ContentStore, SeoFields};
use tracing::{debug, info, instrument, warn};

use crate::frontmatter;

const PAGE_EXTENSION: &str = "md";
const SECTION_INDEX: &str = "_index.md";

/// Content tree rooted at a directory such as `content/`.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Creates a store over the content tree at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_dir(&self, category: &Category, collection: &CollectionName) -> PathBuf {
        self.root.join(category.as_str()).join(collection.as_str())
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    #[instrument(skip(self), fields(category = %category, collection = %collection))]
    async fn list(
        &self,
        category: &Category,
        collection: &CollectionName,
    ) -> Result<Vec<PathBuf>, ContentError> {
        let dir = self.collection_dir(category, collection);
        let mut reader = match tokio::fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %dir.display(), "collection directory not found");
                return Ok(Vec::new());
            }
            Err(source) => return Err(ContentError::Io { path: dir, source }),
        };

        let mut pages = Vec::new();
        loop {
            let entry = reader
                .next_entry()
                .await
                .map_err(|source| ContentError::Io {
                    path: dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            let is_page = path.extension().is_some_and(|ext| ext == PAGE_EXTENSION)
                && path.file_name().is_some_and(|name| name != SECTION_INDEX);
            if is_page {
                pages.push(path);
            }
        }
        pages.sort();
        debug!(count = pages.len(), "collection listed");
        Ok(pages)
    }

    fn page_path(
        &self,
        category: &Category,
        collection: &CollectionName,
        file_name: &str,
    ) -> PathBuf {
        self.collection_dir(category, collection).join(file_name)
    }

    async fn read(&self, path: &Path) -> Result<ContentEntry, ContentError> {
        let text = read_text(path).await?;
        let (frontmatter, body) = frontmatter::parse(path, &text)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ContentEntry {
            path: path.to_path_buf(),
            file_name,
            frontmatter,
            body,
        })
    }

    #[instrument(skip(self, fields), fields(path = %path.display()))]
    async fn update_frontmatter(
        &self,
        path: &Path,
        fields: &SeoFields,
    ) -> Result<(), ContentError> {
        let text = read_text(path).await?;
        let (mut fm, body) = frontmatter::parse(path, &text)?;
        frontmatter::merge_seo_fields(&mut fm, fields);
        let rendered = frontmatter::render(path, &fm, &body)?;

        tokio::fs::write(path, rendered)
            .await
            .map_err(|source| ContentError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        info!("frontmatter updated");
        Ok(())
    }
}

async fn read_text(path: &Path) -> Result<String, ContentError> {
    tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ContentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ContentError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
