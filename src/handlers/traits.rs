use regex::Regex;

use crate::models::PlatformRef;

/// Trait for platform-specific URL handlers.
pub trait PlatformHandler: Send + Sync {
    /// Unique identifier for this handler.
    fn site_id(&self) -> &'static str;

    /// URL patterns this handler matches.
    fn url_patterns(&self) -> &[Regex];

    /// Check if this handler can handle the given URL.
    fn can_handle(&self, url: &str) -> bool {
        self.url_patterns().iter().any(|p| p.is_match(url))
    }

    /// Collapse domain aliases and apply generic normalization.
    fn normalize_url(&self, url: &str) -> String {
        super::normalize::normalize_url(url)
    }

    /// Priority for handler selection (higher = preferred).
    fn priority(&self) -> i32 {
        0
    }

    /// Classify an already-normalized URL.
    fn classify(&self, normalized_url: &str) -> PlatformRef;
}
