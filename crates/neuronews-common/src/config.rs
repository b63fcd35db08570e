//! Runtime configuration, loaded from the environment (`.env` supported).

use std::env;

use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// The PubMed query the scheduled ingestion run uses unless overridden.
pub const DEFAULT_TOPIC_QUERY: &str =
    r#""Neurosurgery"[MeSH] OR "Neurosurgical Procedures"[MeSH]"#;

pub const DEFAULT_LLM_MODEL: &str = "claude-haiku-4-5-20251001";

/// All knobs the two batch runs and the trigger surface need.
///
/// Secrets are wrapped in [`SecretString`] so they never end up in debug
/// output or log lines.
pub struct Config {
    pub database_url: String,
    pub cron_secret: SecretString,
    pub anthropic_api_key: SecretString,
    pub llm_model: String,
    pub pubmed_api_key: Option<String>,
    pub topic_query: String,
    /// Lookback window for the search stage, in days.
    pub lookback_days: i64,
    /// Per-run identifier cap (search retmax).
    pub max_results: usize,
    /// Per-run cap on articles sent to the enrichment processor.
    pub enrich_limit: i64,
    /// Bind address for the trigger server, e.g. "127.0.0.1:3001".
    pub bind_addr: String,
}

impl Config {
    /// Load configuration from the process environment. A `.env` file in
    /// the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            cron_secret: SecretString::from(require("CRON_SECRET")?),
            anthropic_api_key: SecretString::from(require("ANTHROPIC_API_KEY")?),
            llm_model: optional("LLM_MODEL")
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            pubmed_api_key: optional("PUBMED_API_KEY"),
            topic_query: optional("TOPIC_QUERY")
                .unwrap_or_else(|| DEFAULT_TOPIC_QUERY.to_string()),
            lookback_days: parsed("LOOKBACK_DAYS", 7)?,
            max_results: parsed("MAX_RESULTS", 200)?,
            enrich_limit: parsed("ENRICH_LIMIT", 10)?,
            bind_addr: optional("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3001".to_string()),
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}
