use regex::Regex;

use super::normalize::{collapse_host, normalize_url};
use super::traits::PlatformHandler;
use crate::constants::CANONICAL_TIKTOK_HOST;
use crate::models::PlatformRef;

static PATTERNS: std::sync::LazyLock<Vec<Regex>> = std::sync::LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)^https?://(www\.)?tiktok\.com(/|$)").unwrap(),
        Regex::new(r"(?i)^https?://vm\.tiktok\.com(/|$)").unwrap(),
        Regex::new(r"(?i)^https?://m\.tiktok\.com(/|$)").unwrap(),
    ]
});

/// `vm.tiktok.com` short links redirect to unknown paths, so they keep their host.
const HOST_ALIASES: &[&str] = &["tiktok.com", "m.tiktok.com"];

pub struct TikTokHandler;

impl TikTokHandler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TikTokHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformHandler for TikTokHandler {
    fn site_id(&self) -> &'static str {
        "tiktok"
    }

    fn url_patterns(&self) -> &[Regex] {
        &PATTERNS
    }

    fn priority(&self) -> i32 {
        100
    }

    fn normalize_url(&self, url: &str) -> String {
        normalize_url(&collapse_host(url, HOST_ALIASES, CANONICAL_TIKTOK_HOST))
    }

    fn classify(&self, _normalized_url: &str) -> PlatformRef {
        PlatformRef::ShortVideo
    }
}
