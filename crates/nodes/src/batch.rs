//! Batch SEO review over many content files.
//!
//! Every file is reviewed through one shared [`ConcurrencyLimiter`] so the
//! whole batch respects the provider's rate. A failure on one file is
//! recorded in its [`ItemOutcome`] and never stops the others. Outcomes come
//! back in target order regardless of completion order.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use pipeline::{
    BatchRunId, CollectionName, ContentError, ContentStore, ImageSource, ReviewError, ReviewInput,
    SeoFields, Timestamp, VisionModel,
};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::limiter::ConcurrencyLimiter;
use crate::review::SeoReviewer;

/// Whether reviewed fields are written back to the content files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Merge the fields into each file's frontmatter.
    Live,
    /// Review only; leave files untouched.
    DryRun,
}

/// Result of one file's review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Fields were produced (and written, in live mode).
    Success,
    /// The file could not be reviewed or updated.
    Failed,
}

/// Per-file record in a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    /// File name of the content file.
    pub file: String,
    /// Outcome.
    pub status: ItemStatus,
    /// Failure message when `status` is [`ItemStatus::Failed`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time spent on this file, excluding time queued in the limiter.
    pub duration_ms: u64,
    /// Reviewed fields when `status` is [`ItemStatus::Success`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<SeoFields>,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Identifier of this run.
    pub run_id: BatchRunId,
    /// When the batch started.
    pub started_at: Timestamp,
    /// One outcome per target, in target order.
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Number of files reviewed successfully.
    pub fn successful(&self) -> usize {
        self.count(ItemStatus::Success)
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.count(ItemStatus::Failed)
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

#[derive(Debug, Error)]
enum ItemError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// Reviews every file in `targets`.
///
/// `collection` is the fallback review subject for files whose frontmatter
/// does not name one.
#[instrument(skip_all, fields(run_id, collection = %collection, total = targets.len()))]
pub async fn review_batch<S, M, C>(
    reviewer: &SeoReviewer<S, M>,
    store: &C,
    limiter: &ConcurrencyLimiter,
    collection: &CollectionName,
    targets: &[PathBuf],
    mode: WriteMode,
) -> BatchReport
where
    S: ImageSource,
    M: VisionModel,
    C: ContentStore,
{
    let run_id = BatchRunId::new_random();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));
    let started_at = Timestamp::now();
    let total = targets.len();

    if total == 0 {
        info!("no files to review");
    } else {
        info!(?mode, "starting SEO review");
    }

    let outcomes = join_all(targets.iter().enumerate().map(|(i, path)| {
        limiter.run(async move {
            let file = file_name(path);
            let started = Instant::now();
            info!(file = %file, "[{}/{total}] reviewing", i + 1);

            let result = review_file(reviewer, store, collection, path, mode).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(fields) => {
                    info!(file = %file, duration_ms, "[{}/{total}] optimized", i + 1);
                    ItemOutcome {
                        file,
                        status: ItemStatus::Success,
                        error: None,
                        duration_ms,
                        fields: Some(fields),
                    }
                }
                Err(err) => {
                    error!(file = %file, duration_ms, error = %err, "[{}/{total}] failed", i + 1);
                    ItemOutcome {
                        file,
                        status: ItemStatus::Failed,
                        error: Some(err.to_string()),
                        duration_ms,
                        fields: None,
                    }
                }
            }
        })
    }))
    .await;

    let report = BatchReport {
        run_id,
        started_at,
        outcomes,
    };
    info!(
        total,
        successful = report.successful(),
        failed = report.failed(),
        "batch SEO review complete"
    );
    report
}

async fn review_file<S, M, C>(
    reviewer: &SeoReviewer<S, M>,
    store: &C,
    collection: &CollectionName,
    path: &Path,
    mode: WriteMode,
) -> Result<SeoFields, ItemError>
where
    S: ImageSource,
    M: VisionModel,
    C: ContentStore,
{
    let entry = store.read(path).await?;
    let input = ReviewInput::from_entry(&entry, collection)?;
    let fields = reviewer.review(&input).await?;
    if mode == WriteMode::Live {
        store.update_frontmatter(path, &fields).await?;
    }
    Ok(fields)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
