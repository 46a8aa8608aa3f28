//! File-system behaviour of the content store.

use std::fs;
use std::path::Path;

use content::FsContentStore;
use pipeline::{Category, CollectionName, ContentError, ContentStore, SeoFields};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

fn seeded() -> (TempDir, FsContentStore) {
    let root = tempfile::tempdir().unwrap();
    let cats = root.path().join("animals").join("cats");
    fs::create_dir_all(&cats).unwrap();
    write(&cats, "_index.md", "---\ntitle: Cats\n---\n");
    write(&cats, "b-cat.md", "---\ntitle: B\ndraft: true\n---\nB body\n");
    write(&cats, "a-cat.md", "---\ntitle: A\nimage_url: https://cdn.test/a.png\n---\nA body\n");
    write(&cats, "notes.txt", "not a page");
    let store = FsContentStore::new(root.path());
    (root, store)
}

fn animals() -> Category {
    Category::new("animals").unwrap()
}

fn cats() -> CollectionName {
    CollectionName::new("cats").unwrap()
}

#[tokio::test]
async fn list_returns_sorted_pages_without_section_index() {
    let (_root, store) = seeded();

    let pages = store.list(&animals(), &cats()).await.unwrap();

    let names: Vec<_> = pages.iter().map(|p| p.file_name().unwrap()).collect();
    assert_eq!(names, vec!["a-cat.md", "b-cat.md"]);
    assert_eq!(pages[0], store.page_path(&animals(), &cats(), "a-cat.md"));

    let entry = store.read(&pages[0]).await.unwrap();
    assert_eq!(entry.file_name, "a-cat.md");
    assert_eq!(entry.body, "A body\n");
}

#[tokio::test]
async fn broken_page_is_listed_and_fails_only_on_read() {
    let (root, store) = seeded();
    let cats_dir = root.path().join("animals").join("cats");
    write(&cats_dir, "aa-broken.md", "---\ntitle: [unclosed\n---\n");

    let pages = store.list(&animals(), &cats()).await.unwrap();

    let names: Vec<_> = pages.iter().map(|p| p.file_name().unwrap()).collect();
    assert_eq!(names, vec!["a-cat.md", "aa-broken.md", "b-cat.md"]);
    assert!(matches!(
        store.read(&pages[1]).await,
        Err(ContentError::MalformedFrontmatter { .. })
    ));
    assert!(store.read(&pages[0]).await.is_ok());
    assert!(store.read(&pages[2]).await.is_ok());
}

#[tokio::test]
async fn missing_collection_lists_empty() {
    let (_root, store) = seeded();
    let dogs = CollectionName::new("dogs").unwrap();

    assert!(store.list(&animals(), &dogs).await.unwrap().is_empty());
}

#[tokio::test]
async fn reading_a_missing_page_is_not_found() {
    let (_root, store) = seeded();
    let path = store.page_path(&animals(), &cats(), "ghost.md");

    let err = store.read(&path).await.unwrap_err();

    assert!(matches!(err, ContentError::NotFound { .. }));
}

#[tokio::test]
async fn update_merges_fields_drops_tags_and_keeps_body() {
    let (_root, store) = seeded();
    let path = store.page_path(&animals(), &cats(), "tagged.md");
    fs::write(
        &path,
        "---\ntitle: Old\ntags:\n- cute\nimage_url: https://cdn.test/t.png\n---\n\nBody stays.\n",
    )
    .unwrap();
    let fields = SeoFields {
        title: "Sleepy Cat Coloring Page".into(),
        description: "A sleepy cat to color.".into(),
        pinterest_title: "Sleepy Cat".into(),
        pinterest_description: "Download this sleepy cat.".into(),
        prompt: "A cat sleeps.".into(),
    };

    store.update_frontmatter(&path, &fields).await.unwrap();

    let entry = store.read(&path).await.unwrap();
    assert_eq!(entry.body, "\nBody stays.\n");
    assert!(entry.frontmatter.get("tags").is_none());
    assert_eq!(entry.frontmatter["title"], "Sleepy Cat Coloring Page");
    assert_eq!(entry.frontmatter["image_url"], "https://cdn.test/t.png");
    assert_eq!(entry.frontmatter["prompt"], "A cat sleeps.");
    let keys: Vec<_> = entry.frontmatter.keys().cloned().collect();
    assert_eq!(keys[..2], ["title".to_string(), "image_url".to_string()]);
}

#[tokio::test]
async fn malformed_frontmatter_is_reported_with_path() {
    let (root, store) = seeded();
    let path = root.path().join("animals").join("cats").join("broken.md");
    fs::write(&path, "---\ntitle: [unclosed\n---\n").unwrap();

    let err = store.read(&path).await.unwrap_err();

    assert!(matches!(&err, ContentError::MalformedFrontmatter { path: p, .. } if p == &path));
}
