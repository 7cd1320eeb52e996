use std::time::Duration;

use thiserror::Error;

use crate::client::{DelayRange, RetryPolicy};
use crate::constants::{DEFAULT_BRAVE_API_URL, DEFAULT_METRICS_URL, DEFAULT_NITTER_URL};
use crate::filter::Thresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Which search backend turns queries into candidate URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Brave web search JSON API (needs a subscription token).
    Brave,
    /// Nitter search results page, scraped for status links.
    Nitter,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Search backend
    pub backend: BackendKind,
    pub brave_api_key: Option<String>,
    pub brave_api_url: String,
    pub nitter_url: String,
    pub results_per_query: usize,

    // Metrics enrichment
    pub metrics_url: String,
    pub enrich_metrics: bool,
    pub enrich_delay: Duration,

    // Rate limiting
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter: DelayRange,
    pub courtesy_delay: DelayRange,
    pub inter_query_delay: DelayRange,

    // Report shaping
    pub thresholds: Option<Thresholds>,
    pub max_items: Option<usize>,
    pub run_deadline: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = parse_backend(&env_or_default("SEARCH_BACKEND", "brave"))?;

        let brave_api_key =
            optional_env("BRAVE_API_KEY").or_else(|| optional_env("BRAVE_SEARCH_API_KEY"));
        if backend == BackendKind::Brave && brave_api_key.is_none() {
            return Err(ConfigError::MissingEnvVar(
                "BRAVE_API_KEY (or BRAVE_SEARCH_API_KEY)".to_string(),
            ));
        }

        Ok(Self {
            // Search backend
            backend,
            brave_api_key,
            brave_api_url: env_or_default("BRAVE_API_URL", DEFAULT_BRAVE_API_URL),
            nitter_url: env_or_default("NITTER_URL", DEFAULT_NITTER_URL),
            results_per_query: parse_env_usize("RESULTS_PER_QUERY", 20)?,

            // Metrics enrichment
            metrics_url: env_or_default("METRICS_URL", DEFAULT_METRICS_URL),
            enrich_metrics: parse_env_bool("ENRICH_METRICS", true)?,
            enrich_delay: Duration::from_millis(parse_env_u64("ENRICH_DELAY_MS", 200)?),

            // Rate limiting
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            max_retries: parse_env_u32("MAX_RETRIES", 6)?,
            base_backoff: Duration::from_millis(parse_env_u64("BASE_BACKOFF_MS", 2000)?),
            max_backoff: Duration::from_millis(parse_env_u64("MAX_BACKOFF_MS", 30_000)?),
            jitter: parse_range_ms("JITTER", 200, 800)?,
            courtesy_delay: parse_range_ms("COURTESY_DELAY", 1200, 1600)?,
            inter_query_delay: parse_range_ms("INTER_QUERY_DELAY", 1300, 1800)?,

            // Report shaping
            thresholds: parse_thresholds()?,
            max_items: parse_optional_usize("MAX_ITEMS")?,
            run_deadline: parse_optional_u64("RUN_DEADLINE_SECS")?.map(Duration::from_secs),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(invalid("MAX_RETRIES", "must be at least 1"));
        }
        if self.base_backoff > self.max_backoff {
            return Err(invalid(
                "BASE_BACKOFF_MS",
                "cannot be greater than MAX_BACKOFF_MS",
            ));
        }
        if self.results_per_query == 0 {
            return Err(invalid("RESULTS_PER_QUERY", "must be at least 1"));
        }
        if self.max_items == Some(0) {
            return Err(invalid("MAX_ITEMS", "must be at least 1 when set"));
        }
        for (name, range) in [
            ("JITTER", &self.jitter),
            ("COURTESY_DELAY", &self.courtesy_delay),
            ("INTER_QUERY_DELAY", &self.inter_query_delay),
        ] {
            if range.min > range.max {
                return Err(invalid(
                    &format!("{name}_MIN_MS"),
                    &format!("cannot be greater than {name}_MAX_MS"),
                ));
            }
        }
        if self.backend == BackendKind::Brave
            && self.brave_api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingEnvVar(
                "BRAVE_API_KEY (or BRAVE_SEARCH_API_KEY)".to_string(),
            ));
        }
        if self.brave_api_url.is_empty() || self.nitter_url.is_empty() {
            return Err(invalid("BRAVE_API_URL/NITTER_URL", "cannot be empty"));
        }
        if self.metrics_url.is_empty() {
            return Err(invalid("METRICS_URL", "cannot be empty"));
        }
        Ok(())
    }

    /// Retry policy for search requests.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_backoff: self.base_backoff,
            max_backoff: self.max_backoff,
            jitter: self.jitter,
        }
    }

    /// Configuration with every delay zeroed, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            backend: BackendKind::Brave,
            brave_api_key: Some("test-token".to_string()),
            brave_api_url: DEFAULT_BRAVE_API_URL.to_string(),
            nitter_url: DEFAULT_NITTER_URL.to_string(),
            results_per_query: 20,
            metrics_url: DEFAULT_METRICS_URL.to_string(),
            enrich_metrics: true,
            enrich_delay: Duration::ZERO,
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            base_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
            jitter: DelayRange::ZERO,
            courtesy_delay: DelayRange::ZERO,
            inter_query_delay: DelayRange::ZERO,
            thresholds: None,
            max_items: None,
            run_deadline: None,
        }
    }
}

fn invalid(name: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_optional_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    optional_env(name)
        .map(|val| {
            val.parse().map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}

fn parse_optional_usize(name: &str) -> Result<Option<usize>, ConfigError> {
    optional_env(name)
        .map(|val| {
            val.parse().map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    Ok(parse_optional_u64(name)?.unwrap_or(default))
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    Ok(parse_optional_usize(name)?.unwrap_or(default))
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

/// Read `{prefix}_MIN_MS` / `{prefix}_MAX_MS` as a delay range.
fn parse_range_ms(
    prefix: &str,
    min_default: u64,
    max_default: u64,
) -> Result<DelayRange, ConfigError> {
    let min = parse_env_u64(&format!("{prefix}_MIN_MS"), min_default)?;
    let max = parse_env_u64(&format!("{prefix}_MAX_MS"), max_default)?;
    Ok(DelayRange::from_millis(min, max))
}

/// Thresholds are only enabled when at least one of them is set.
fn parse_thresholds() -> Result<Option<Thresholds>, ConfigError> {
    let likes = parse_optional_u64("MIN_LIKES")?;
    let reposts = parse_optional_u64("MIN_REPOSTS")?;
    let replies = parse_optional_u64("MIN_REPLIES")?;

    if likes.is_none() && reposts.is_none() && replies.is_none() {
        return Ok(None);
    }

    Ok(Some(Thresholds {
        min_likes: likes.unwrap_or(0),
        min_reposts: reposts.unwrap_or(0),
        min_replies: replies.unwrap_or(0),
    }))
}

fn parse_backend(value: &str) -> Result<BackendKind, ConfigError> {
    match value.to_lowercase().as_str() {
        "brave" => Ok(BackendKind::Brave),
        "nitter" => Ok(BackendKind::Nitter),
        _ => Err(ConfigError::InvalidValue {
            name: "SEARCH_BACKEND".to_string(),
            message: format!("must be 'brave' or 'nitter', got '{value}'"),
        }),
    }
}
