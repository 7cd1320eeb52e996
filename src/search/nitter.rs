use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::SearchBackend;
use crate::client::{FetchError, RateLimitedClient};
use crate::constants::CANONICAL_X_HOST;
use crate::dedup::dedupe_urls;

/// Relative status link, optionally followed by a fragment (`#m` on nitter).
static STATUS_HREF: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^(/[^/?#\s]+/status/\d+)(?:#[^/]*)?$").unwrap());

/// Nitter search page scraper.
pub struct NitterSearch {
    client: RateLimitedClient,
    base_url: String,
}

impl NitterSearch {
    #[must_use]
    pub fn new(client: RateLimitedClient, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?f=tweets&q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl SearchBackend for NitterSearch {
    fn name(&self) -> &'static str {
        "nitter"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, FetchError> {
        let request = self.client.http().get(self.search_url(query)).build()?;
        let html = self.client.execute(request).await?;
        let urls = extract_status_links(&html, count);
        debug!(query = %query, results = urls.len(), "Nitter search returned results");
        Ok(urls)
    }
}

/// Extract status links from a search results page.
///
/// Anchors whose `href` is `/<handle>/status/<digits>` are rebuilt on the
/// canonical X host, deduplicated in page order and capped at `limit`.
#[must_use]
pub fn extract_status_links(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a[href]").expect("Invalid selector");

    let urls = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| STATUS_HREF.captures(href.trim()))
        .map(|caps| format!("https://{CANONICAL_X_HOST}{}", &caps[1]))
        .collect();

    let mut urls = dedupe_urls(urls);
    urls.truncate(limit);
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r##"
        <html><body>
          <div class="timeline-item">
            <a class="tweet-link" href="/alice/status/111#m"></a>
            <a class="username" href="/alice">@alice</a>
            <a class="tweet-date" href="/alice/status/111#m">1h</a>
          </div>
          <div class="timeline-item">
            <a class="tweet-link" href="/bob/status/222#m"></a>
            <a href="/bob/status/222/photo/1">photo</a>
            <a href="/search?q=%23meme">#meme</a>
          </div>
          <div class="timeline-item">
            <a class="tweet-link" href="/carol/status/333"></a>
            <a href="https://example.com/carol/status/444">external</a>
            <a href="/dave/status/abc">bad</a>
          </div>
        </body></html>
    "##;

    #[test]
    fn test_extracts_and_rebuilds_links() {
        assert_eq!(
            extract_status_links(SAMPLE_PAGE, 20),
            vec![
                "https://x.com/alice/status/111".to_string(),
                "https://x.com/bob/status/222".to_string(),
                "https://x.com/carol/status/333".to_string(),
            ]
        );
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        assert_eq!(
            extract_status_links(SAMPLE_PAGE, 2),
            vec![
                "https://x.com/alice/status/111".to_string(),
                "https://x.com/bob/status/222".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_status_links("<html></html>", 10).is_empty());
        assert!(extract_status_links("", 10).is_empty());
    }

    #[test]
    fn test_search_url_encoding() {
        let client = RateLimitedClient::new(
            std::time::Duration::from_secs(1),
            crate::client::RetryPolicy::single_attempt(),
        )
        .unwrap();
        let backend = NitterSearch::new(client, "https://nitter.example/".to_string());
        assert_eq!(
            backend.search_url("meme coin #1"),
            "https://nitter.example/search?f=tweets&q=meme%20coin%20%231"
        );
    }
}
