//! Layered configuration.
//!
//! Built-in defaults, then `.paperpause/config.toml` (or the file passed with
//! `--config`), then `PAPERPAUSE__*` environment variables, e.g.
//! `PAPERPAUSE__LIMITER__MAX_CONCURRENT=1`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use nodes::{BackoffSettings, LimiterSettings};
use pipeline::PolicyError;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = ".paperpause/config";
const ENV_PREFIX: &str = "PAPERPAUSE";
const API_KEY_ENV: &str = "GEMINI_API_KEY";
const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Errors produced while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match [`AppConfig`].
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    /// Neither the configuration nor the environment holds an API key.
    #[error("Missing Gemini API key: set gemini.api_key or GEMINI_API_KEY")]
    MissingApiKey,

    /// A value parsed but is not usable.
    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Dotted configuration key, e.g. `gemini.model`.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Retry or limiter numbers are out of range.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Fully merged application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where content pages live.
    pub content: ContentSettings,
    /// Vision model provider.
    pub gemini: GeminiSettings,
    /// Review prompt overrides.
    #[serde(default)]
    pub review: ReviewSettings,
    /// Transport retry around every model call.
    pub retry: BackoffSettings,
    /// Shared limiter for batch reviews.
    pub limiter: LimiterSettings,
    /// Trace export.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

/// `[content]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    /// Root of the content tree.
    pub root: PathBuf,
}

/// `[gemini]` section.
#[derive(Clone, Deserialize)]
pub struct GeminiSettings {
    /// API key; `GEMINI_API_KEY` is used when unset.
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// `[review]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewSettings {
    /// File replacing the built-in prompt template.
    pub prompt_template: Option<PathBuf>,
}

/// `[telemetry]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetrySettings {
    /// OTLP gRPC collector, e.g. `http://localhost:4317`.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Loads configuration. An explicit `path` must exist; the default file
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let cfg = Config::builder()
            .set_default("content.root", "content")?
            .set_default("gemini.model", llm::DEFAULT_MODEL)?
            .set_default("gemini.base_url", llm::DEFAULT_BASE_URL)?
            .set_default("retry.max_attempts", 3_i64)?
            .set_default("retry.initial_delay_ms", 1000_i64)?
            .set_default("retry.backoff_multiplier", 2.0)?
            .set_default("limiter.max_concurrent", 2_i64)?
            .set_default("limiter.min_spacing_ms", 5000_i64)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    /// The configured API key, or `GEMINI_API_KEY`.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        resolve_api_key(self.gemini.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    /// The configured OTLP endpoint, or `OTEL_EXPORTER_OTLP_ENDPOINT`.
    pub fn otlp_endpoint(&self) -> Option<String> {
        non_blank(self.telemetry.otlp_endpoint.as_deref())
            .or_else(|| non_blank(std::env::var(OTLP_ENDPOINT_ENV).ok().as_deref()))
    }
}

fn resolve_api_key(
    configured: Option<&str>,
    fallback: Option<String>,
) -> Result<String, ConfigError> {
    non_blank(configured)
        .or_else(|| non_blank(fallback.as_deref()))
        .ok_or(ConfigError::MissingApiKey)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let toml = concat!(
            "[gemini]\nmodel = \"gemini-2.0-pro\"\n\n",
            "[limiter]\nmax_concurrent = 1\n\n",
            "[review]\nprompt_template = \"prompts/seo.txt\"\n",
        );
        file.write_all(toml.as_bytes()).unwrap();

        let cfg = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(cfg.gemini.model, "gemini-2.0-pro");
        assert_eq!(cfg.gemini.base_url, llm::DEFAULT_BASE_URL);
        assert_eq!(cfg.limiter.max_concurrent, 1);
        assert_eq!(cfg.limiter.min_spacing_ms, 5000);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.retry.backoff_multiplier, 2.0);
        assert_eq!(cfg.content.root, PathBuf::from("content"));
        assert_eq!(cfg.review.prompt_template, Some(PathBuf::from("prompts/seo.txt")));
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(AppConfig::load(Some(&missing)), Err(ConfigError::Load(_))));
    }

    #[test]
    fn api_key_prefers_configured_value() {
        assert_eq!(resolve_api_key(Some("cfg"), Some("env".into())).unwrap(), "cfg");
        assert_eq!(resolve_api_key(Some("  "), Some("env".into())).unwrap(), "env");
        assert!(matches!(resolve_api_key(None, None), Err(ConfigError::MissingApiKey)));
    }
}
