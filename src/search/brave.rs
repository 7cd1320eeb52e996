use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use super::SearchBackend;
use crate::client::{FetchError, RateLimitedClient};
use crate::dedup::dedupe_urls;

/// Header carrying the Brave subscription token.
const TOKEN_HEADER: &str = "X-Subscription-Token";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Option<Vec<WebResult>>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    url: Option<String>,
}

/// Brave web search API backend.
pub struct BraveSearch {
    client: RateLimitedClient,
    endpoint: String,
    api_key: String,
}

impl BraveSearch {
    #[must_use]
    pub fn new(client: RateLimitedClient, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl SearchBackend for BraveSearch {
    fn name(&self) -> &'static str {
        "brave"
    }

    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, FetchError> {
        let request = self
            .client
            .http()
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, &self.api_key)
            .query(&[("q", query), ("count", count.to_string().as_str())])
            .build()?;

        let body = self.client.execute(request).await?;
        let urls = extract_result_urls(&body)?;
        debug!(query = %query, results = urls.len(), "Brave search returned results");
        Ok(urls)
    }

    fn courtesy_delay(&self) -> Duration {
        self.client.courtesy_delay()
    }
}

/// Pull `web.results[].url` out of a Brave response, in order and deduplicated.
///
/// Missing `web` or `results` sections mean no results, not an error.
///
/// # Errors
///
/// Returns an error if `body` is not valid JSON.
pub fn extract_result_urls(body: &str) -> Result<Vec<String>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let urls = response
        .web
        .and_then(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| result.url)
        .filter(|url| !url.is_empty())
        .collect();

    Ok(dedupe_urls(urls))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_order() {
        let body = r#"{
            "web": {"results": [
                {"url": "https://x.com/a/status/1", "title": "one"},
                {"url": "https://www.tiktok.com/@b/video/2"},
                {"title": "no url"},
                {"url": "https://x.com/a/status/1"}
            ]}
        }"#;

        assert_eq!(
            extract_result_urls(body).unwrap(),
            vec![
                "https://x.com/a/status/1".to_string(),
                "https://www.tiktok.com/@b/video/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_sections_are_empty() {
        assert!(extract_result_urls("{}").unwrap().is_empty());
        assert!(extract_result_urls(r#"{"web": {}}"#).unwrap().is_empty());
        assert!(extract_result_urls(r#"{"web": {"results": null}}"#)
            .unwrap()
            .is_empty());
        assert!(extract_result_urls(r#"{"web": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            extract_result_urls("<html>"),
            Err(FetchError::Decode(_))
        ));
    }
}
