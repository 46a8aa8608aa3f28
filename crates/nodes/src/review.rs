//! SEO review of one coloring page image.
//!
//! [`SeoReviewer::review`] downloads the image, renders the prompt, and asks
//! the vision model for metadata. The answer is parsed, auto-fixed and
//! validated by [`pipeline::seo`].
//!
//! If that attempt fails for any reason other than the image download, the
//! model is asked exactly once more with a corrective instruction that echoes
//! the failure. The second failure, if any, goes to the caller as-is.
//!
//! The reviewer writes nothing and holds no state between calls.

use pipeline::prompt::with_correction;
use pipeline::seo::{extract_json_object, finalize};
use pipeline::{
    ImageSource, InlineImage, PromptTemplate, ReviewError, ReviewInput, SeoFields, VisionModel,
};
use tracing::{debug, info, instrument, warn};

/// Produces validated [`SeoFields`] for page images.
#[derive(Debug, Clone)]
pub struct SeoReviewer<S, M> {
    images: S,
    model: M,
    template: PromptTemplate,
}

impl<S: ImageSource, M: VisionModel> SeoReviewer<S, M> {
    /// Creates a reviewer using the built-in prompt template.
    pub fn new(images: S, model: M) -> Self {
        Self {
            images,
            model,
            template: PromptTemplate::builtin(),
        }
    }

    /// Replaces the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// The vision model in use.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Reviews one image.
    #[instrument(skip_all, fields(subject = %input.subject, image_url = %input.image_url))]
    pub async fn review(&self, input: &ReviewInput) -> Result<SeoFields, ReviewError> {
        let image = self.images.fetch(&input.image_url).await?;
        debug!(mime_type = %image.mime_type, bytes = image.bytes.len(), "image fetched");

        let prompt = self.template.render(input);
        match self.attempt(&prompt, &image).await {
            Ok(fields) => Ok(fields),
            Err(err) if err.is_correctable() => {
                warn!(error = %err, "review attempt rejected; re-prompting once");
                let corrected = with_correction(&prompt, &err.to_string());
                let fields = self.attempt(&corrected, &image).await?;
                info!("review succeeded after corrective re-prompt");
                Ok(fields)
            }
            Err(err) => Err(err),
        }
    }

    async fn attempt(&self, prompt: &str, image: &InlineImage) -> Result<SeoFields, ReviewError> {
        let text = self.model.describe(prompt, image).await?;
        debug!(length = text.len(), "model response received");
        let raw = extract_json_object(&text)?;
        Ok(finalize(&raw)?)
    }
}
