//! Best-effort engagement metrics for status posts.
//!
//! The read endpoint is unauthenticated and its field names drift between
//! camelCase and snake_case spellings, so every count is looked up through an
//! ordered alias list. Any failure yields `None`; enrichment never fails a run.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::RateLimitedClient;
use crate::models::Metrics;

/// Field names for like counts, most preferred first.
pub const LIKE_ALIASES: &[&str] = &["favorite_count", "favoriteCount", "like_count"];

/// Field names for repost counts, most preferred first.
pub const REPOST_ALIASES: &[&str] = &["retweet_count", "retweetCount", "repost_count"];

/// Field names for reply counts, most preferred first.
pub const REPLY_ALIASES: &[&str] = &["reply_count", "replyCount", "conversation_count"];

/// Fetches engagement metrics by platform id.
pub struct MetricsEnricher {
    client: RateLimitedClient,
    endpoint: String,
}

impl MetricsEnricher {
    /// `client` should use a single-attempt policy; lookups are not worth retrying.
    #[must_use]
    pub fn new(client: RateLimitedClient, endpoint: String) -> Self {
        Self { client, endpoint }
    }

    /// URL queried for `platform_id`. Also recorded as [`Metrics::source`].
    #[must_use]
    pub fn source_url(&self, platform_id: &str) -> String {
        format!(
            "{}?id={}&lang=en",
            self.endpoint,
            urlencoding::encode(platform_id)
        )
    }

    /// Look up metrics for `platform_id`, or `None` if anything goes wrong.
    pub async fn enrich(&self, platform_id: &str) -> Option<Metrics> {
        let source = self.source_url(platform_id);

        let request = match self.client.http().get(&source).build() {
            Ok(request) => request,
            Err(e) => {
                debug!(tweet_id = %platform_id, error = %e, "Invalid metrics request");
                return None;
            }
        };

        let body = match self.client.execute(request).await {
            Ok(body) => body,
            Err(e) => {
                debug!(tweet_id = %platform_id, error = %e, "Metrics lookup failed");
                return None;
            }
        };

        let metrics = parse_metrics(&body, source);
        if metrics.is_none() {
            debug!(tweet_id = %platform_id, "Metrics payload was not a JSON object");
        }
        metrics
    }
}

/// Parse a metrics payload into counts.
///
/// Returns `None` when `body` is not a JSON object. Each count comes from the
/// first alias holding a usable number; absent counts are 0.
#[must_use]
pub fn parse_metrics(body: &str, source: String) -> Option<Metrics> {
    let value: Value = serde_json::from_str(body).ok()?;
    let fields = value.as_object()?;

    Some(Metrics {
        likes: read_count(fields, LIKE_ALIASES),
        reposts: read_count(fields, REPOST_ALIASES),
        replies: read_count(fields, REPLY_ALIASES),
        source,
    })
}

fn read_count(fields: &Map<String, Value>, aliases: &[&str]) -> u64 {
    aliases
        .iter()
        .find_map(|alias| fields.get(*alias).and_then(as_count))
        .unwrap_or(0)
}

/// Interpret a JSON value as a count. Negative numbers clamp to 0.
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<i64>().ok().map(|i| i.max(0) as u64))
        }
        _ => None,
    }
}
