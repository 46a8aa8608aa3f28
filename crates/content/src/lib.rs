//! PaperPause content adapter.
//!
//! Implements [`pipeline::ContentStore`] over a Hugo-style content tree:
//! `<root>/<category>/<collection>/<page>.md`, each page a YAML frontmatter
//! block followed by a Markdown body. Also reads the generation manifests
//! that name the pages produced by one generation run.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File system access and YAML handling live here. The
//! [`pipeline`] crate only ever sees parsed [`pipeline::ContentEntry`] values.
//!
//! ## Frontmatter policy
//!
//! Updates merge into the existing frontmatter, keep key order, and always
//! drop the legacy `tags` key. The Markdown body is never modified.

pub mod frontmatter;
pub mod manifest;
pub mod store;

pub use manifest::{read_manifest, resolve_targets, GenerationManifest};
pub use store::FsContentStore;
