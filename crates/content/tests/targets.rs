//! Choosing the pages a batch reviews.

use std::fs;
use std::path::{Path, PathBuf};

use content::{resolve_targets, FsContentStore};
use pipeline::{Category, CollectionName};
use tempfile::TempDir;

fn animals() -> Category {
    Category::new("animals").unwrap()
}

fn cats() -> CollectionName {
    CollectionName::new("cats").unwrap()
}

fn seeded() -> (TempDir, FsContentStore) {
    let root = tempfile::tempdir().unwrap();
    let cats = root.path().join("animals").join("cats");
    fs::create_dir_all(&cats).unwrap();
    fs::write(cats.join("_index.md"), "---\ntitle: Cats\n---\n").unwrap();
    fs::write(cats.join("b.md"), "---\ntitle: B\n---\n").unwrap();
    fs::write(cats.join("a.md"), "---\ntitle: A\n---\n").unwrap();
    let store = FsContentStore::new(root.path());
    (root, store)
}

fn collection_pages(root: &Path) -> Vec<PathBuf> {
    let cats = root.join("animals").join("cats");
    vec![cats.join("a.md"), cats.join("b.md")]
}

fn manifest(root: &Path, text: &str) -> PathBuf {
    let path = root.join("manifest.json");
    fs::write(&path, text).unwrap();
    path
}

#[tokio::test]
async fn manifest_pages_are_used_as_written() {
    let (root, store) = seeded();
    let path = manifest(
        root.path(),
        r#"{"runId":"2025-01-06-cats","created":["content/animals/cats/new.md"]}"#,
    );

    let targets = resolve_targets(&store, Some(&path), &animals(), &cats())
        .await
        .unwrap();

    assert_eq!(targets, vec![PathBuf::from("content/animals/cats/new.md")]);
}

#[tokio::test]
async fn no_manifest_lists_the_collection() {
    let (root, store) = seeded();

    let targets = resolve_targets(&store, None, &animals(), &cats())
        .await
        .unwrap();

    assert_eq!(targets, collection_pages(root.path()));
}

#[tokio::test]
async fn missing_manifest_falls_back_to_the_collection() {
    let (root, store) = seeded();
    let absent = root.path().join("absent.json");

    let targets = resolve_targets(&store, Some(&absent), &animals(), &cats())
        .await
        .unwrap();

    assert_eq!(targets, collection_pages(root.path()));
}

#[tokio::test]
async fn malformed_manifest_falls_back_to_the_collection() {
    let (root, store) = seeded();
    let path = manifest(root.path(), "{ \"runId\": ");

    let targets = resolve_targets(&store, Some(&path), &animals(), &cats())
        .await
        .unwrap();

    assert_eq!(targets, collection_pages(root.path()));
}

#[tokio::test]
async fn empty_manifest_falls_back_to_the_collection() {
    let (root, store) = seeded();
    let path = manifest(root.path(), r#"{"runId":"r1","created":[]}"#);

    let targets = resolve_targets(&store, Some(&path), &animals(), &cats())
        .await
        .unwrap();

    assert_eq!(targets, collection_pages(root.path()));
}
