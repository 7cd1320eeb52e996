use chrono::{DateTime, Utc};

use crate::client::FetchError;
use crate::dedup::dedupe_items;
use crate::filter::{apply_thresholds, Thresholds};
use crate::models::{ErrorKind, Item, QueryError, RunReport};

/// Record a failed query.
#[must_use]
pub fn query_error(query: &str, err: &FetchError) -> QueryError {
    QueryError {
        query: query.to_string(),
        status: err.status(),
        body: err.body(),
        kind: err.kind(),
    }
}

/// Record a query that never ran to completion.
#[must_use]
pub fn unfinished_query(query: &str, reason: &str) -> QueryError {
    QueryError {
        query: query.to_string(),
        status: None,
        body: reason.to_string(),
        kind: ErrorKind::Transient,
    }
}

/// Assemble the final report.
///
/// Items are deduplicated, then filtered, then truncated to `max_items`
/// without reordering. `count` is taken before truncation.
#[must_use]
pub fn build_report(
    generated_at: DateTime<Utc>,
    queries: &[String],
    items: Vec<Item>,
    errors: Vec<QueryError>,
    thresholds: Option<&Thresholds>,
    max_items: Option<usize>,
) -> RunReport {
    let mut items = dedupe_items(items);
    if let Some(thresholds) = thresholds {
        items = apply_thresholds(items, thresholds);
    }

    let count = items.len();
    if let Some(max) = max_items {
        items.truncate(max);
    }

    RunReport {
        generated_at,
        queries: queries.to_vec(),
        count,
        items,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::classify;
    use crate::models::Metrics;

    fn item(url: &str, query: &str) -> Item {
        let classified = classify(url);
        Item::new(classified.url, classified.platform, query)
    }

    fn queries() -> Vec<String> {
        vec!["q1".to_string(), "q2".to_string()]
    }

    #[test]
    fn test_truncation_is_stable() {
        let items = (1..=5)
            .map(|i| item(&format!("https://x.com/u/status/{i}"), "q1"))
            .collect();
        let report = build_report(Utc::now(), &queries(), items, Vec::new(), None, Some(3));

        assert_eq!(report.count, 5);
        let urls: Vec<&str> = report.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.com/u/status/1",
                "https://x.com/u/status/2",
                "https://x.com/u/status/3",
            ]
        );
    }

    #[test]
    fn test_dedup_before_filter() {
        let enriched = item("https://x.com/u/status/1", "q1").with_metrics(Some(Metrics {
            likes: 500,
            reposts: 50,
            replies: 50,
            source: "s".to_string(),
        }));
        let items = vec![
            enriched,
            item("https://x.com/u/status/1", "q2"),
            item("https://x.com/u/status/2", "q2"),
        ];
        let thresholds = Thresholds {
            min_likes: 100,
            min_reposts: 0,
            min_replies: 0,
        };

        let report = build_report(
            Utc::now(),
            &queries(),
            items,
            Vec::new(),
            Some(&thresholds),
            None,
        );
        assert_eq!(report.count, 1);
        assert_eq!(report.items[0].from_query, "q1");
    }

    #[test]
    fn test_queries_and_errors_carried_verbatim() {
        let errors = vec![
            query_error(
                "q1",
                &FetchError::Status {
                    status: 500,
                    body: "oops".to_string(),
                },
            ),
            unfinished_query("q2", "run deadline exceeded"),
        ];
        let report = build_report(Utc::now(), &queries(), Vec::new(), errors, None, None);

        assert_eq!(report.queries, queries());
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].kind, ErrorKind::Terminal);
        assert_eq!(report.errors[0].status, Some(500));
        assert_eq!(report.errors[1].kind, ErrorKind::Transient);
        assert_eq!(report.errors[1].status, None);
    }
}
