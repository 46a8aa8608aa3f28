//! YAML frontmatter splitting, parsing, and rendering.
//!
//! A document with frontmatter starts with a `---` line and the block ends
//! at the next line that is exactly `---`. Everything after that line is the
//! body, byte for byte. A document that does not start with `---` has no
//! frontmatter and is all body.

use std::path::Path;

use pipeline::{ContentError, Frontmatter, SeoField, SeoFields};
use serde_json::Value;

const DELIMITER: &str = "---";

/// Key removed from every frontmatter block that gets rewritten.
pub const RETIRED_TAGS_KEY: &str = "tags";

/// Splits `text` into its raw YAML block and body.
///
/// Returns `Ok(None)` when the document has no frontmatter.
pub fn split(text: &str) -> Result<Option<(&str, &str)>, &'static str> {
    let Some(rest) = text.strip_prefix(DELIMITER) else {
        return Ok(None);
    };
    let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    Err("frontmatter block is not closed")
}

/// Parses a document into its frontmatter map and body.
pub fn parse(path: &Path, text: &str) -> Result<(Frontmatter, String), ContentError> {
    let malformed = |reason: String| ContentError::MalformedFrontmatter {
        path: path.to_path_buf(),
        reason,
    };

    let (yaml, body) = match split(text).map_err(|r| malformed(r.to_string()))? {
        Some(parts) => parts,
        None => return Ok((Frontmatter::new(), text.to_string())),
    };
    if yaml.trim().is_empty() {
        return Ok((Frontmatter::new(), body.to_string()));
    }

    match serde_yaml::from_str::<Value>(yaml).map_err(|e| malformed(e.to_string()))? {
        Value::Object(map) => Ok((map, body.to_string())),
        Value::Null => Ok((Frontmatter::new(), body.to_string())),
        other => Err(malformed(format!("expected a mapping, found {}", kind(&other)))),
    }
}

/// Renders frontmatter and body back into a document.
pub fn render(path: &Path, frontmatter: &Frontmatter, body: &str) -> Result<String, ContentError> {
    let yaml = serde_yaml::to_string(frontmatter).map_err(|e| ContentError::MalformedFrontmatter {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
}

/// Writes the reviewed fields over `frontmatter` and drops the `tags` key.
///
/// Existing keys keep their position; new keys are appended.
pub fn merge_seo_fields(frontmatter: &mut Frontmatter, fields: &SeoFields) {
    for field in SeoField::ALL {
        let value = Value::String(fields.get(field).to_string());
        frontmatter.insert(field.as_str().to_string(), value);
    }
    frontmatter.retain(|key, _| key != RETIRED_TAGS_KEY);
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn p() -> &'static Path {
        Path::new("page.md")
    }

    #[test]
    fn split_finds_block_and_body() {
        let (yaml, body) = split("---\ntitle: A\n---\n\nBody\n").unwrap().unwrap();
        assert_eq!(yaml, "title: A\n");
        assert_eq!(body, "\nBody\n");
    }

    #[test]
    fn split_handles_crlf() {
        let (yaml, body) = split("---\r\ntitle: A\r\n---\r\nBody").unwrap().unwrap();
        assert_eq!(yaml, "title: A\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn document_without_frontmatter_is_all_body() {
        let (fm, body) = parse(p(), "# Heading\n").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let err = parse(p(), "---\ntitle: A\n").unwrap_err();
        assert!(matches!(err, ContentError::MalformedFrontmatter { .. }));
    }

    #[test]
    fn scalar_frontmatter_is_malformed() {
        let err = parse(p(), "---\njust text\n---\n").unwrap_err();
        assert!(err.to_string().contains("expected a mapping, found a string"));
    }

    #[test]
    fn empty_block_is_empty_map() {
        let (fm, body) = parse(p(), "---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn merge_overwrites_in_place_and_drops_tags() {
        let (mut fm, _) = parse(
            p(),
            "---\ntitle: Old\ntags:\n  - cat\ndraft: true\nimage_url: https://x/y.png\n---\n",
        )
        .unwrap();
        let fields = SeoFields {
            title: "New".into(),
            description: "D".into(),
            pinterest_title: "PT".into(),
            pinterest_description: "PD".into(),
            prompt: "P".into(),
        };

        merge_seo_fields(&mut fm, &fields);

        let keys: Vec<_> = fm.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "title",
                "draft",
                "image_url",
                "description",
                "pinterest_title",
                "pinterest_description",
                "prompt"
            ]
        );
        assert_eq!(fm["title"], json!("New"));
        assert_eq!(fm["draft"], json!(true));
    }

    #[test]
    fn render_then_parse_keeps_body_verbatim() {
        let mut fm = Frontmatter::new();
        fm.insert("title".into(), json!("Cat: the sequel"));
        let body = "\nSome *markdown*\n\n---\nnot frontmatter\n";

        let text = render(p(), &fm, body).unwrap();
        let (parsed, parsed_body) = parse(p(), &text).unwrap();

        assert_eq!(parsed, fm);
        assert_eq!(parsed_body, body);
    }
}
