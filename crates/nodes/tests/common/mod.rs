//! In-memory fakes for the pipeline ports.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{
    Category, CollectionName, ContentEntry, ContentError, ContentStore, Frontmatter, ImageSource,
    InlineImage, ReviewError, SeoFields, VisionModel,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Canned model output
// ---------------------------------------------------------------------------

/// `"word word ..."` of exactly `len` chars, never ending in a space.
pub fn text_of(len: usize) -> String {
    let mut s = "word ".repeat(len / 5 + 1);
    s.truncate(len);
    if s.ends_with(' ') {
        s.pop();
        s.push('x');
    }
    s
}

/// Model output that passes validation untouched.
pub fn conforming_json(title: &str) -> String {
    json!({
        "title": title,
        "description": text_of(150),
        "pinterest_title": format!("{title} for Kids"),
        "pinterest_description": text_of(250),
        "prompt": "A tabby cat naps on a rug."
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Serves every URL as a PNG whose bytes are the URL, except URLs containing
/// `"missing"`, which fail with a 404.
#[derive(Default)]
pub struct FakeImages {
    pub fetches: AtomicU32,
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch(&self, url: &str) -> Result<InlineImage, ReviewError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if url.contains("missing") {
            return Err(ReviewError::ImageFetch {
                status: 404,
                body: "Not Found".into(),
            });
        }
        Ok(InlineImage {
            mime_type: "image/png".into(),
            bytes: url.as_bytes().to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// One scripted model reply.
pub enum Reply {
    Text(String),
    Fail(String),
}

/// Replays replies in order and records every prompt it was sent.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, n: usize) -> String {
        self.prompts.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn describe(&self, prompt: &str, _image: &InlineImage) -> Result<String, ReviewError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(msg)) => Err(ReviewError::Transport(msg)),
            None => Err(ReviewError::Transport("script exhausted".into())),
        }
    }
}

/// Answers with conforming JSON unless the image URL contains `"garbled"`,
/// in which case it answers with prose.
#[derive(Default)]
pub struct ImageKeyedModel {
    pub calls: AtomicU32,
}

#[async_trait]
impl VisionModel for ImageKeyedModel {
    async fn describe(&self, _prompt: &str, image: &InlineImage) -> Result<String, ReviewError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = String::from_utf8_lossy(&image.bytes);
        if url.contains("garbled") {
            Ok("I think this is a lovely picture.".into())
        } else {
            Ok(conforming_json("Sleepy Cat Coloring Page"))
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Content files held in memory, keyed by path.
#[derive(Default)]
pub struct MemoryStore {
    pages: Mutex<BTreeMap<PathBuf, ContentEntry>>,
    pub writes: Mutex<Vec<(PathBuf, SeoFields)>>,
}

impl MemoryStore {
    /// Adds a page whose frontmatter is `fm`.
    pub fn insert(&self, path: &str, fm: Value) -> PathBuf {
        let path = PathBuf::from(path);
        let frontmatter: Frontmatter = match fm {
            Value::Object(map) => map,
            _ => Frontmatter::new(),
        };
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        let entry = ContentEntry {
            path: path.clone(),
            file_name,
            frontmatter,
            body: String::new(),
        };
        self.pages.lock().unwrap().insert(path.clone(), entry);
        path
    }

    pub fn written_files(&self) -> Vec<PathBuf> {
        self.writes.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list(
        &self,
        category: &Category,
        collection: &CollectionName,
    ) -> Result<Vec<PathBuf>, ContentError> {
        let dir = PathBuf::from(format!("content/{category}/{collection}"));
        Ok(self
            .pages
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.parent() == Some(dir.as_path()))
            .cloned()
            .collect())
    }

    fn page_path(
        &self,
        category: &Category,
        collection: &CollectionName,
        file_name: &str,
    ) -> PathBuf {
        PathBuf::from(format!("content/{category}/{collection}/{file_name}"))
    }

    async fn read(&self, path: &Path) -> Result<ContentEntry, ContentError> {
        self.pages
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ContentError::NotFound {
                path: path.to_path_buf(),
            })
    }

    async fn update_frontmatter(
        &self,
        path: &Path,
        fields: &SeoFields,
    ) -> Result<(), ContentError> {
        self.writes.lock().unwrap().push((path.to_path_buf(), fields.clone()));
        Ok(())
    }
}
