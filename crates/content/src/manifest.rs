//! Generation run manifests.
//!
//! A generation run writes a JSON manifest naming the pages it created:
//!
//! ```json
//! { "runId": "2025-01-06-cats", "created": ["content/animals/cats/a.md"] }
//! ```
//!
//! Paths are used as written, relative to the working directory.
//!
//! A batch prefers the manifest's pages and falls back to the whole
//! collection when the manifest is missing, unreadable, or empty; see
//! [`resolve_targets`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pipeline::{Category, CollectionName, ContentError, ContentStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pages produced by one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationManifest {
    /// Identifier of the generation run.
    #[serde(rename = "runId")]
    pub run_id: String,
    /// Created page paths.
    #[serde(default)]
    pub created: Vec<PathBuf>,
}

/// Reads a manifest. A missing file is `Ok(None)`.
pub async fn read_manifest(path: &Path) -> Result<Option<GenerationManifest>, ContentError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ContentError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&text).map(Some).map_err(|e| ContentError::Manifest {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Pages to review in one batch.
///
/// The manifest's `created` list when `manifest` names a readable manifest
/// with at least one page; otherwise every page of the collection. Only a
/// failure to list the collection is an error.
pub async fn resolve_targets<C: ContentStore>(
    store: &C,
    manifest: Option<&Path>,
    category: &Category,
    collection: &CollectionName,
) -> Result<Vec<PathBuf>, ContentError> {
    if let Some(path) = manifest {
        match read_manifest(path).await {
            Ok(Some(m)) if !m.created.is_empty() => {
                info!(run_id = %m.run_id, files = m.created.len(), "loaded manifest");
                return Ok(m.created);
            }
            Ok(Some(_)) => warn!(path = %path.display(), "manifest lists no files"),
            Ok(None) => warn!(path = %path.display(), "manifest not found"),
            Err(err) => warn!(error = %err, "ignoring unreadable manifest"),
        }
        info!(%category, %collection, "reviewing the whole collection");
    }
    store.list(category, collection).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_camel_case_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, r#"{"runId":"r1","created":["a.md","b.md"]}"#).unwrap();

        let manifest = read_manifest(&path).await.unwrap().unwrap();

        assert_eq!(manifest.run_id, "r1");
        assert_eq!(manifest.created, vec![PathBuf::from("a.md"), PathBuf::from("b.md")]);
    }

    #[tokio::test]
    async fn missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_manifest(&dir.path().join("nope.json")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_manifest(&path).await.unwrap_err();
        assert!(matches!(err, ContentError::Manifest { .. }));
    }
}
