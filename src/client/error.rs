use thiserror::Error;

use crate::constants::ERROR_BODY_LIMIT;
use crate::models::ErrorKind;

/// Failure of a single logical request made through [`super::RateLimitedClient`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt was answered with 429.
    #[error("rate limited: gave up after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },
    /// Non-success, non-429 response. Not retried.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The request body could not be cloned for another attempt.
    #[error("request cannot be replayed")]
    NotReplayable,
}

impl FetchError {
    /// Classify the failure for the run report.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RateLimitExceeded { .. } => ErrorKind::Transient,
            Self::Transport(e) if e.is_builder() => ErrorKind::Terminal,
            Self::Transport(_) => ErrorKind::Transient,
            Self::Status { .. } | Self::Decode(_) | Self::NotReplayable => ErrorKind::Terminal,
        }
    }

    /// HTTP status associated with the failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimitExceeded { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::NotReplayable => None,
        }
    }

    /// Human-readable body for the report, already truncated.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::RateLimitExceeded { .. } => "Rate-limited: max retries exceeded".to_string(),
            Self::Status { body, .. } => body.clone(),
            other => truncate_body(&other.to_string(), ERROR_BODY_LIMIT),
        }
    }
}

/// Truncate to at most `limit` characters without splitting a code point.
#[must_use]
pub fn truncate_body(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
