//! PaperPause review orchestration.
//!
//! This crate drives the SEO review of coloring pages: the back-off executor
//! and concurrency limiter that protect the vision provider, the
//! [`ModelGateway`] that puts retries in front of any [`pipeline::VisionModel`],
//! the single-image [`SeoReviewer`], and the [`review_batch`] runner.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Everything here sequences calls between the
//! business rules in [`pipeline`] and the port traits it defines. No file,
//! network, or provider code lives in this crate; callers inject it.
//!
//! ## Retry layering
//!
//! A provider call is retried by the gateway for transport errors. One level
//! up, the reviewer re-prompts exactly once when the model's answer cannot be
//! parsed or validated. The batch runner then spaces whole reviews through a
//! shared [`ConcurrencyLimiter`].

pub mod backoff;
pub mod batch;
pub mod gateway;
pub mod limiter;
pub mod review;

pub use backoff::{retry, retry_with_observer, BackoffPolicy, BackoffSettings};
pub use batch::{review_batch, BatchReport, ItemOutcome, ItemStatus, WriteMode};
pub use gateway::ModelGateway;
pub use limiter::{ConcurrencyLimiter, LimiterSettings, LimiterStatus};
pub use review::SeoReviewer;
