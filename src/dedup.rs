//! Order-preserving deduplication.
//!
//! Used twice per run: on each backend response (a single page can repeat a
//! link) and once over every item collected across queries.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::debug;

use crate::models::Item;

/// Keep the first occurrence of each key, preserving relative order.
pub fn dedupe_by_key<T, K, F>(values: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::with_capacity(values.len());
    values.into_iter().filter(|v| seen.insert(key(v))).collect()
}

/// Deduplicate raw URLs exactly as returned by a backend.
#[must_use]
pub fn dedupe_urls(urls: Vec<String>) -> Vec<String> {
    dedupe_by_key(urls, Clone::clone)
}

/// Deduplicate items by canonical URL. The first item seen keeps its `fromQuery`.
#[must_use]
pub fn dedupe_items(items: Vec<Item>) -> Vec<Item> {
    let before = items.len();
    let unique = dedupe_by_key(items, |item| item.url.clone());
    if unique.len() < before {
        debug!(removed = before - unique.len(), kept = unique.len(), "Removed duplicate items");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::classify;

    fn item(url: &str, query: &str) -> Item {
        let classified = classify(url);
        Item::new(classified.url, classified.platform, query)
    }

    #[test]
    fn test_dedupe_urls_preserves_order() {
        let urls = vec![
            "https://a.example/1".to_string(),
            "https://b.example/2".to_string(),
            "https://a.example/1".to_string(),
            "https://c.example/3".to_string(),
            "https://b.example/2".to_string(),
        ];
        assert_eq!(
            dedupe_urls(urls),
            vec![
                "https://a.example/1".to_string(),
                "https://b.example/2".to_string(),
                "https://c.example/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_first_query_wins() {
        let items = vec![
            item("https://x.com/a/status/1", "q1"),
            item("https://x.com/b/status/2", "q1"),
            item("https://x.com/a/status/1", "q2"),
        ];
        let unique = dedupe_items(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].from_query, "q1");
        assert_eq!(unique[0].url.as_str(), "https://x.com/a/status/1");
    }

    #[test]
    fn test_alias_domains_collapse() {
        let items = vec![
            item("https://twitter.com/a/status/1", "q1"),
            item("https://x.com/a/status/1", "q2"),
        ];
        let unique = dedupe_items(items);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].from_query, "q1");
    }

    #[test]
    fn test_idempotent() {
        let items = vec![
            item("https://x.com/a/status/1", "q1"),
            item("https://www.tiktok.com/@v/video/5", "q1"),
            item("https://x.com/a/status/1", "q2"),
            item("https://example.com/", "q2"),
        ];
        let once = dedupe_items(items);
        let twice = dedupe_items(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty() {
        assert!(dedupe_items(Vec::new()).is_empty());
        assert!(dedupe_urls(Vec::new()).is_empty());
    }
}
