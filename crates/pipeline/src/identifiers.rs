//! Newtype domain identifiers.
//!
//! Content on the site is addressed as `<category>/<collection>/<file>.md`
//! (for example `animals/cats/sleepy-tabby.md`). Each path segment that
//! callers pass around gets its own newtype so a [`Category`] can never be
//! handed to a function expecting a [`CollectionName`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: content addressing
// ---------------------------------------------------------------------------

string_id! {
    /// Top-level content section (e.g. `"animals"`).
    ///
    /// Corresponds to a directory directly under the content root that holds
    /// an `_index.md`.
    Category
}

string_id! {
    /// A collection of coloring pages inside a [`Category`] (e.g. `"cats"`).
    ///
    /// Also used as the fallback review subject when a page's frontmatter
    /// does not name one.
    CollectionName
}

string_id! {
    /// Vision model identifier as understood by the provider
    /// (e.g. `"gemini-2.5-flash"`).
    ModelName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single batch review run.
///
/// Generated fresh for every batch; recorded in the batch report and in the
/// tracing span so all per-item activity from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchRunId(Uuid);

impl BatchRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BatchRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
