//! `review-one` and `review-batch`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Args;
use content::{resolve_targets, FsContentStore};
use llm::{GeminiConfig, GeminiVisionClient, HttpImageSource};
use nodes::{review_batch, BackoffPolicy, ConcurrencyLimiter, ModelGateway, SeoReviewer, WriteMode};
use pipeline::{
    Category, CollectionName, ContentStore, Frontmatter, ModelName, PromptTemplate, ReviewError,
    ReviewInput, SeoField, SeoFields,
};
use serde_json::Value;
use tracing::info;

use crate::config::{AppConfig, ConfigError};

type Reviewer = SeoReviewer<HttpImageSource, ModelGateway<GeminiVisionClient>>;

/// Arguments of `review-one`.
#[derive(Debug, Args)]
pub struct ReviewOneArgs {
    /// Content category, e.g. `animals`.
    #[arg(value_parser = parse_category)]
    pub category: Category,
    /// Collection inside the category, e.g. `cats`.
    #[arg(value_parser = parse_collection)]
    pub collection: CollectionName,
    /// Page file name, e.g. `sleepy-cat.md`.
    pub filename: String,
    /// Print only the reviewed fields as JSON.
    #[arg(long)]
    pub json: bool,
    /// Write the reviewed fields into the page's frontmatter.
    #[arg(long)]
    pub live: bool,
}

/// Arguments of `review-batch`.
#[derive(Debug, Args)]
pub struct ReviewBatchArgs {
    /// Content category, e.g. `animals`.
    #[arg(value_parser = parse_category)]
    pub category: Category,
    /// Collection inside the category, e.g. `cats`.
    #[arg(value_parser = parse_collection)]
    pub collection: CollectionName,
    /// Generation manifest naming the pages to review.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Review without writing any file.
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::new(s).ok_or_else(|| "category must not be blank".to_string())
}

fn parse_collection(s: &str) -> Result<CollectionName, String> {
    CollectionName::new(s).ok_or_else(|| "collection must not be blank".to_string())
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Concrete adapters wired from configuration.
pub struct Services {
    reviewer: Reviewer,
    store: FsContentStore,
    limiter: ConcurrencyLimiter,
}

impl Services {
    /// Builds every adapter. Fails on a missing API key, bad retry or
    /// limiter numbers, or an unreadable prompt template.
    pub async fn build(cfg: &AppConfig) -> anyhow::Result<Self> {
        let model = ModelName::new(cfg.gemini.model.as_str()).ok_or(ConfigError::Invalid {
            key: "gemini.model",
            reason: "must not be blank".into(),
        })?;
        let client = GeminiVisionClient::new(GeminiConfig {
            api_key: cfg.api_key()?,
            model,
            base_url: cfg.gemini.base_url.clone(),
        });
        info!(model = %client.model(), "vision model configured");
        let policy = BackoffPolicy::try_from(cfg.retry.clone()).map_err(ConfigError::from)?;

        let template = match &cfg.review.prompt_template {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading prompt template {}", path.display()))?;
                PromptTemplate::from_text(text)
            }
            None => PromptTemplate::builtin(),
        };

        Ok(Self {
            reviewer: SeoReviewer::new(HttpImageSource::new(), ModelGateway::new(client, policy))
                .with_template(template),
            store: FsContentStore::new(&cfg.content.root),
            limiter: ConcurrencyLimiter::try_from(cfg.limiter.clone()).map_err(ConfigError::from)?,
        })
    }
}

// ---------------------------------------------------------------------------
// review-one
// ---------------------------------------------------------------------------

/// Reviews one page, prints the result, and writes it with `--live`.
pub async fn review_one(services: &Services, args: &ReviewOneArgs) -> anyhow::Result<ExitCode> {
    let path = services.store.page_path(&args.category, &args.collection, &args.filename);
    let entry = services.store.read(&path).await?;
    let input = ReviewInput::from_entry(&entry, &args.collection)?;
    info!(
        path = %path.display(),
        image_url = %input.image_url,
        subject = %input.subject,
        "reviewing page"
    );

    let fields = match services.reviewer.review(&input).await {
        Ok(fields) => fields,
        Err(ReviewError::Validation(err)) => {
            eprintln!("\nValidation details:\n{}", serde_json::to_string_pretty(&err.details)?);
            eprintln!("{err}");
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };
    let output = serde_json::to_string_pretty(&fields)?;

    if args.json {
        println!("{output}");
    } else {
        println!("\n--- Model JSON output ---\n\n{output}");
        println!("\n--- Proposed frontmatter changes ---\n");
        for change in frontmatter_diff(&entry.frontmatter, &fields) {
            println!("{}:", change.field);
            println!("- old: {}", Value::String(change.old));
            println!("+ new: {}\n", Value::String(change.new));
        }
    }

    if args.live {
        services.store.update_frontmatter(&path, &fields).await?;
        info!(path = %path.display(), "file updated");
    } else if !args.json {
        println!("No changes were written. File: {}", path.display());
        println!("Use --live to write changes to the file.");
    }
    Ok(ExitCode::SUCCESS)
}

/// One field whose reviewed value differs from the current frontmatter.
#[derive(Debug, PartialEq, Eq)]
pub struct FieldChange {
    /// The changed field.
    pub field: SeoField,
    /// Current frontmatter value, empty when absent.
    pub old: String,
    /// Reviewed value.
    pub new: String,
}

/// Fields that would change. Empty new values and unchanged values are
/// skipped; non-string old values compare by their JSON text.
pub fn frontmatter_diff(old: &Frontmatter, new: &SeoFields) -> Vec<FieldChange> {
    SeoField::ALL
        .into_iter()
        .filter_map(|field| {
            let old = match old.get(field.as_str()) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            let new = new.get(field).to_string();
            (!new.is_empty() && old != new).then_some(FieldChange { field, old, new })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// review-batch
// ---------------------------------------------------------------------------

/// Reviews a manifest's pages, or the whole collection, and prints the
/// outcomes. Fails when any page failed.
pub async fn review_collection(
    services: &Services,
    args: &ReviewBatchArgs,
) -> anyhow::Result<ExitCode> {
    let targets = resolve_targets(
        &services.store,
        args.manifest.as_deref(),
        &args.category,
        &args.collection,
    )
    .await?;

    let mode = if args.dry_run { WriteMode::DryRun } else { WriteMode::Live };
    let report = review_batch(
        &services.reviewer,
        &services.store,
        &services.limiter,
        &args.collection,
        &targets,
        mode,
    )
    .await;

    println!("{}", serde_json::to_string_pretty(&report.outcomes)?);
    Ok(if report.failed() > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
