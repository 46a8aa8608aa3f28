//! Shaping free-form model output into validated [`SeoFields`].
//!
//! Model output passes through three stages, none of which keep state
//! between calls:
//!
//! 1. [`coerce`] maps an arbitrary JSON value onto the five fields. Missing or
//!    non-string values become empty strings and whitespace is collapsed.
//! 2. [`auto_fix`] repairs what can be repaired deterministically: truncating
//!    long fields at word or sentence boundaries, padding a short pin
//!    description with a call to action, and trimming the alt text to two
//!    sentences. It never fails.
//! 3. [`validate`] checks every length contract and reports *all* violations
//!    at once in a [`SeoValidationError`].
//!
//! [`finalize`] runs the three in order. [`extract_json_object`] pulls the
//! JSON value out of the raw model text first.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::errors::{FieldViolation, ReviewError, SeoValidationError};
use crate::text::{collapse_whitespace, split_sentences, truncate_at_word, truncate_to_sentence};
use crate::types::{
    DESCRIPTION_MAX, PINTEREST_DESCRIPTION_MAX, PINTEREST_DESCRIPTION_MIN, PINTEREST_TITLE_MAX,
    TITLE_MAX,
};
use crate::{SeoField, SeoFields};

/// Connector words that must not dangle at the end of a truncated title.
const DANGLING_CONNECTORS: [&str; 6] = ["and", "with", "or", "in", "on", "of"];

/// Keywords that mark a pin description as already carrying a call to action.
const CTA_KEYWORDS: [&str; 3] = ["download", "print", "get"];

/// Padding for short pin descriptions that already carry a call to action.
pub const CTA_PRESENT_SUFFIX: &str = " Perfect for relaxation and creativity!";

/// Padding for short pin descriptions that lack a call to action.
pub const CTA_MISSING_SUFFIX: &str = " Download this free printable today!";

const VALIDATION_FAILED: &str = "SEO output validation failed";

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extracts the JSON object from raw model text.
///
/// Accepts, in order of preference: text that is itself a JSON object, a
/// JSON object inside a fenced code block (optionally tagged `json`), or the
/// span from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Result<Value, ReviewError> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return parse(trimmed);
    }

    if let Some(candidate) = fenced_block(trimmed) {
        if candidate.starts_with('{') {
            return parse(candidate);
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(first), Some(last)) if last > first => parse(&trimmed[first..=last]),
        _ => Err(ReviewError::NoJson),
    }
}

fn parse(candidate: &str) -> Result<Value, ReviewError> {
    serde_json::from_str(candidate).map_err(|e| ReviewError::InvalidJson(e.to_string()))
}

/// Returns the trimmed contents of the first fenced code block, if closed.
fn fenced_block(text: &str) -> Option<&str> {
    const FENCE: &str = "```";

    let open = text.find(FENCE)?;
    let mut rest = &text[open + FENCE.len()..];
    if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
        rest = &rest[4..];
    }
    let close = rest.find(FENCE)?;
    Some(rest[..close].trim())
}

// ---------------------------------------------------------------------------
// Coerce
// ---------------------------------------------------------------------------

/// Maps arbitrary model output onto [`SeoFields`].
///
/// Never fails: anything that is not a string (including a missing key or a
/// non-object `raw`) becomes an empty string.
pub fn coerce(raw: &Value) -> SeoFields {
    let field = |key: SeoField| {
        raw.get(key.as_str())
            .and_then(Value::as_str)
            .map(collapse_whitespace)
            .unwrap_or_default()
    };

    SeoFields {
        title: field(SeoField::Title),
        description: field(SeoField::Description),
        pinterest_title: field(SeoField::PinterestTitle),
        pinterest_description: field(SeoField::PinterestDescription),
        prompt: field(SeoField::Prompt),
    }
}

// ---------------------------------------------------------------------------
// Auto-fix
// ---------------------------------------------------------------------------

/// Best-effort deterministic repair of out-of-range fields.
pub fn auto_fix(mut fields: SeoFields) -> SeoFields {
    fields.title = strip_dangling_connector(&truncate_at_word(&fields.title, TITLE_MAX));
    fields.pinterest_title =
        strip_dangling_connector(&truncate_at_word(&fields.pinterest_title, PINTEREST_TITLE_MAX));

    if char_len(&fields.description) > DESCRIPTION_MAX {
        fields.description = truncate_to_sentence(&fields.description, DESCRIPTION_MAX);
    }

    fields.pinterest_description = fix_pinterest_description(&fields.pinterest_description);
    fields.prompt = keep_first_two_sentences(&fields.prompt);
    fields
}

/// Clamps the pin description to 300 chars and pads it once if under 200.
///
/// Padding appends a single suffix. If the padded text is still short it is
/// left for the validator to reject.
fn fix_pinterest_description(text: &str) -> String {
    let mut out = text.to_string();
    if char_len(&out) > PINTEREST_DESCRIPTION_MAX {
        out = truncate_to_sentence(&out, PINTEREST_DESCRIPTION_MAX);
    }

    if char_len(&out) < PINTEREST_DESCRIPTION_MIN {
        let suffix = if has_call_to_action(&out) {
            CTA_PRESENT_SUFFIX
        } else {
            CTA_MISSING_SUFFIX
        };
        debug!(length = char_len(&out), suffix, "padding short pinterest_description");

        out = collapse_whitespace(&format!("{out}{suffix}"));
        if char_len(&out) > PINTEREST_DESCRIPTION_MAX {
            out = truncate_to_sentence(&out, PINTEREST_DESCRIPTION_MAX);
        }
    }
    out
}

fn has_call_to_action(text: &str) -> bool {
    let lower = text.to_lowercase();
    CTA_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Removes one trailing connector word (`and`, `with`, ...) left by truncation.
fn strip_dangling_connector(text: &str) -> String {
    match text.rsplit_once(char::is_whitespace) {
        Some((head, last))
            if DANGLING_CONNECTORS
                .iter()
                .any(|c| last.eq_ignore_ascii_case(c)) =>
        {
            head.trim_end().to_string()
        }
        _ => text.to_string(),
    }
}

fn keep_first_two_sentences(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= 2 {
        return text.trim().to_string();
    }
    format!("{} {}", sentences[0], sentences[1]).trim().to_string()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

/// Checks every field contract, collecting all violations.
pub fn validate(fields: SeoFields) -> Result<SeoFields, SeoValidationError> {
    let mut details = BTreeMap::new();

    for field in SeoField::ALL {
        let value = fields.get(field);
        let len = char_len(value);
        let bounds = field.bounds();
        if value.is_empty() || !bounds.contains(len) {
            details.insert(
                field,
                FieldViolation {
                    actual_length: len,
                    min: bounds.min,
                    max: bounds.max,
                },
            );
        }
    }

    if details.is_empty() {
        Ok(fields)
    } else {
        Err(SeoValidationError {
            message: VALIDATION_FAILED.to_string(),
            details,
        })
    }
}

/// Coerces, auto-fixes and validates parsed model output.
pub fn finalize(raw: &Value) -> Result<SeoFields, SeoValidationError> {
    validate(auto_fix(coerce(raw)))
}
