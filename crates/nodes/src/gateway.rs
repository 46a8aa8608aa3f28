//! Transport-level retry around a [`VisionModel`].
//!
//! [`ModelGateway`] is itself a [`VisionModel`], so the reviewer can not
//! tell it apart from the provider it wraps. Every `describe` call runs
//! through [`crate::backoff::retry`]. This retry sits *inside* the
//! reviewer's single corrective re-prompt: one reviewer attempt may cost up
//! to `max_attempts` provider calls.

use async_trait::async_trait;
use pipeline::{InlineImage, ReviewError, VisionModel};

use crate::backoff::{retry, BackoffPolicy};

/// Wraps a model provider with exponential back-off.
#[derive(Debug, Clone)]
pub struct ModelGateway<M> {
    inner: M,
    policy: BackoffPolicy,
}

impl<M: VisionModel> ModelGateway<M> {
    /// Wraps `inner`, retrying failed calls according to `policy`.
    pub fn new(inner: M, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: VisionModel> VisionModel for ModelGateway<M> {
    async fn describe(&self, prompt: &str, image: &InlineImage) -> Result<String, ReviewError> {
        retry(&self.policy, || self.inner.describe(prompt, image)).await
    }
}
