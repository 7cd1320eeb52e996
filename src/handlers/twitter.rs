use regex::Regex;

use super::normalize::{collapse_host, normalize_url, strip_query_params};
use super::traits::PlatformHandler;
use crate::constants::CANONICAL_X_HOST;
use crate::models::PlatformRef;

static PATTERNS: std::sync::LazyLock<Vec<Regex>> = std::sync::LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)^https?://(www\.)?twitter\.com(/|$)").unwrap(),
        Regex::new(r"(?i)^https?://(www\.)?x\.com(/|$)").unwrap(),
        Regex::new(r"(?i)^https?://mobile\.twitter\.com(/|$)").unwrap(),
        Regex::new(r"(?i)^https?://mobile\.x\.com(/|$)").unwrap(),
    ]
});

/// Hosts that serve the same content as `x.com`.
const HOST_ALIASES: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "www.x.com",
    "mobile.x.com",
];

/// Share-state parameters X appends to copied links.
const SHARE_PARAMS: &[&str] = &["s", "t", "lang"];

/// Status id as a whole path segment: `/status/<digits>` followed by `/` or the end.
static TWEET_ID_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"/status/(\d+)(?:/|$)").unwrap());

pub struct TwitterHandler;

impl TwitterHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TwitterHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformHandler for TwitterHandler {
    fn site_id(&self) -> &'static str {
        "x"
    }

    fn url_patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn priority(&self) -> i32 {
        100
    }

    fn normalize_url(&self, url: &str) -> String {
        let collapsed = collapse_host(url, HOST_ALIASES, CANONICAL_X_HOST);
        normalize_url(&strip_query_params(&collapsed, SHARE_PARAMS))
    }

    fn classify(&self, normalized_url: &str) -> PlatformRef {
        extract_tweet_id(normalized_url).map_or(PlatformRef::Unknown, |platform_id| {
            PlatformRef::StatusPost { platform_id }
        })
    }
}

/// Extract tweet ID from a Twitter/X URL.
///
/// Twitter URLs have format: `https://x.com/{user}/status/{tweet_id}`. Only the
/// path is inspected, so query strings cannot smuggle in an id.
#[must_use]
pub fn extract_tweet_id(url: &str) -> Option<String> {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    TWEET_ID_PATTERN
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
