//! Vision-model prompt construction.
//!
//! The template is plain text with `{{subject}}`, `{{style}}`, `{{medium}}`
//! and `{{originalPrompt}}` placeholders. Every occurrence of a placeholder is
//! replaced. A missing original prompt renders as `Not provided`.

use crate::ReviewInput;

/// Rendered in place of `{{originalPrompt}}` when the page has no prompt.
pub const MISSING_ORIGINAL_PROMPT: &str = "Not provided";

const BUILTIN_TEMPLATE: &str = r#"You are an SEO copywriter for PaperPause, a site of free printable coloring pages.

Look at the attached coloring page and write its metadata.

Context:
- Subject: {{subject}}
- Style: {{style}}
- Suggested medium: {{medium}}
- Prompt the image was generated from: {{originalPrompt}}

Describe what is actually drawn. Do not invent objects that are not in the image.

Return ONLY a JSON object with exactly these fields and no commentary:
{
  "title": "at most 50 characters, ends with 'Coloring Page' when it fits",
  "description": "meta description, 140 to 160 characters, mentions that the page is free and printable",
  "pinterest_title": "at most 80 characters",
  "pinterest_description": "200 to 300 characters, inviting, ends with a call to action",
  "prompt": "one or two plain sentences literally describing the image, for alt text"
}

Character limits are strict. Count characters before answering."#;

/// Prompt template for the SEO review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// The built-in SEO copywriter template.
    pub fn builtin() -> Self {
        Self::from_text(BUILTIN_TEMPLATE)
    }

    /// A template from caller-supplied text (e.g. a file override).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Substitutes `input` into the template.
    pub fn render(&self, input: &ReviewInput) -> String {
        let original = input
            .original_prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(MISSING_ORIGINAL_PROMPT);

        self.text
            .replace("{{subject}}", &input.subject)
            .replace("{{style}}", &input.style)
            .replace("{{medium}}", &input.medium)
            .replace("{{originalPrompt}}", original)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Appends the corrective instruction used for the single re-prompt after a
/// failed attempt. `error` is echoed back to the model verbatim.
pub fn with_correction(prompt: &str, error: &str) -> String {
    format!(
        "{prompt}\n\nIMPORTANT: Your previous response was invalid ({error}). \
         Return ONLY valid JSON matching the required fields and character limits."
    )
}
