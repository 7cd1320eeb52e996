//! Shared constants used across the application.

/// User agent string sent with every outbound request.
///
/// Search result pages and the metrics endpoint both reject obvious bot agents.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

pub const DEFAULT_NITTER_URL: &str = "https://nitter.net";

pub const DEFAULT_METRICS_URL: &str = "https://cdn.syndication.twimg.com/tweet-result";

/// Host every Twitter/X alias collapses to.
pub const CANONICAL_X_HOST: &str = "x.com";

/// Host every TikTok alias (except short links) collapses to.
pub const CANONICAL_TIKTOK_HOST: &str = "www.tiktok.com";

/// Maximum number of characters of a response body kept in errors.
pub const ERROR_BODY_LIMIT: usize = 300;
