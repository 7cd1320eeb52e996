//! Types that flow through a run and end up in the report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A URL after alias collapsing and generic normalization. Used as the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Wrap an already-normalized URL. Use [`crate::handlers::classify`] for raw input.
    #[must_use]
    pub fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of post a URL points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "snake_case")]
pub enum PlatformRef {
    /// A status post with a numeric id the metrics endpoint understands.
    StatusPost {
        #[serde(rename = "tweetId")]
        platform_id: String,
    },
    ShortVideo,
    /// Recorded in the report but never enriched.
    Unknown,
}

impl PlatformRef {
    /// Id usable for metrics lookups, if any.
    #[must_use]
    pub fn platform_id(&self) -> Option<&str> {
        match self {
            Self::StatusPost { platform_id } => Some(platform_id),
            Self::ShortVideo | Self::Unknown => None,
        }
    }
}

/// Engagement counts for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    /// Endpoint the counts were read from.
    pub source: String,
}

/// A discovered post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub url: CanonicalUrl,
    #[serde(flatten)]
    pub platform: PlatformRef,
    pub metrics: Option<Metrics>,
    pub from_query: String,
}

impl Item {
    #[must_use]
    pub fn new(url: CanonicalUrl, platform: PlatformRef, from_query: &str) -> Self {
        Self {
            url,
            platform,
            metrics: None,
            from_query: from_query.to_string(),
        }
    }

    /// A copy of this item carrying `metrics`.
    #[must_use]
    pub fn with_metrics(self, metrics: Option<Metrics>) -> Self {
        Self { metrics, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Rate limiting, timeouts, deadline expiry. Worth retrying later.
    Transient,
    /// The backend rejected the query outright.
    Terminal,
}

/// A query that produced no results because of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryError {
    pub query: String,
    pub status: Option<u16>,
    pub body: String,
    pub kind: ErrorKind,
}

/// Output of one run. Written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unix seconds at which the run started.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub generated_at: DateTime<Utc>,
    pub queries: Vec<String>,
    /// Number of items that survived dedup and filtering, before truncation.
    pub count: usize,
    pub items: Vec<Item>,
    pub errors: Vec<QueryError>,
}
