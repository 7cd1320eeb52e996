//! URL canonicalization and platform classification.

mod normalize;
mod registry;
mod tiktok;
mod traits;
mod twitter;

pub use normalize::{collapse_host, normalize_url, strip_query_params};
pub use registry::HandlerRegistry;
pub use tiktok::TikTokHandler;
pub use traits::PlatformHandler;
pub use twitter::{extract_tweet_id, TwitterHandler};

use tracing::trace;

use crate::models::{CanonicalUrl, PlatformRef};

/// Global handler registry.
pub static HANDLERS: std::sync::LazyLock<HandlerRegistry> = std::sync::LazyLock::new(|| {
    let mut registry = HandlerRegistry::new();
    registry.register(Box::new(TwitterHandler::new()));
    registry.register(Box::new(TikTokHandler::new()));
    registry
});

/// A raw URL mapped to its canonical form and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub url: CanonicalUrl,
    pub platform: PlatformRef,
}

/// Canonicalize `raw` and decide what kind of post it points at.
///
/// URLs no handler claims get generic normalization and [`PlatformRef::Unknown`].
#[must_use]
pub fn classify(raw: &str) -> Classified {
    let (url, platform) = match HANDLERS.find_handler(raw) {
        Some(handler) => {
            let url = handler.normalize_url(raw);
            let platform = handler.classify(&url);
            trace!(handler = handler.site_id(), url = %url, ?platform, "Classified URL");
            (url, platform)
        }
        None => (normalize_url(raw), PlatformRef::Unknown),
    };

    Classified {
        url: CanonicalUrl::new_unchecked(url),
        platform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_and_canonical_collapse() {
        let alias = classify("https://twitter.com/user/status/42");
        let canonical = classify("https://x.com/user/status/42");
        assert_eq!(alias, canonical);
        assert_eq!(alias.url.as_str(), "https://x.com/user/status/42");
    }

    #[test]
    fn test_status_post() {
        assert_eq!(
            classify("https://x.com/user/status/12345").platform,
            PlatformRef::StatusPost {
                platform_id: "12345".to_string()
            }
        );
    }

    #[test]
    fn test_non_numeric_status_is_unknown() {
        assert_eq!(
            classify("https://x.com/user/status/abc").platform,
            PlatformRef::Unknown
        );
    }

    #[test]
    fn test_short_video() {
        let result = classify("https://tiktok.com/@user/video/7");
        assert_eq!(result.platform, PlatformRef::ShortVideo);
        assert_eq!(result.url.as_str(), "https://www.tiktok.com/@user/video/7");
    }

    #[test]
    fn test_status_path_on_other_host_is_unknown() {
        let result = classify("https://mastodon.example/user/status/123");
        assert_eq!(result.platform, PlatformRef::Unknown);
    }

    #[test]
    fn test_share_params_only_stripped_on_x() {
        let post = classify("https://twitter.com/user/status/42?s=20&t=abc");
        assert_eq!(post.url.as_str(), "https://x.com/user/status/42");

        let first = classify("https://example.com/results?s=foo");
        let second = classify("https://example.com/results?s=bar");
        assert_ne!(first.url, second.url);
    }

    #[test]
    fn test_unknown_is_still_normalized() {
        let result = classify("http://Example.com/page/?utm_source=x#top");
        assert_eq!(result.platform, PlatformRef::Unknown);
        assert_eq!(result.url.as_str(), "https://example.com/page");
    }
}
