//! Engagement threshold filtering.

use serde::{Deserialize, Serialize};

use crate::models::{Item, Metrics, PlatformRef};

/// Minimum engagement an enriched post must reach. All bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min_likes: u64,
    pub min_reposts: u64,
    pub min_replies: u64,
}

/// Whether `metrics` clears every threshold.
///
/// Missing metrics never pass: an unenriched post is not evidence of zero
/// engagement.
#[must_use]
pub fn passes(metrics: Option<&Metrics>, thresholds: &Thresholds) -> bool {
    metrics.is_some_and(|m| {
        m.likes >= thresholds.min_likes
            && m.reposts >= thresholds.min_reposts
            && m.replies >= thresholds.min_replies
    })
}

/// Drop status posts that miss `thresholds`, keeping order.
///
/// Only status posts have a metrics source, so short videos and unknown links
/// are kept as-is.
#[must_use]
pub fn apply_thresholds(items: Vec<Item>, thresholds: &Thresholds) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| match item.platform {
            PlatformRef::StatusPost { .. } => passes(item.metrics.as_ref(), thresholds),
            PlatformRef::ShortVideo | PlatformRef::Unknown => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalUrl;

    const VIRAL: Thresholds = Thresholds {
        min_likes: 200,
        min_reposts: 20,
        min_replies: 10,
    };

    fn metrics(likes: u64, reposts: u64, replies: u64) -> Metrics {
        Metrics {
            likes,
            reposts,
            replies,
            source: "test".to_string(),
        }
    }

    fn status_item(id: &str, m: Option<Metrics>) -> Item {
        Item::new(
            CanonicalUrl::new_unchecked(format!("https://x.com/u/status/{id}")),
            PlatformRef::StatusPost {
                platform_id: id.to_string(),
            },
            "q",
        )
        .with_metrics(m)
    }

    #[test]
    fn test_boundary_values_pass() {
        assert!(passes(Some(&metrics(200, 20, 10)), &VIRAL));
    }

    #[test]
    fn test_one_below_fails() {
        assert!(!passes(Some(&metrics(199, 20, 10)), &VIRAL));
        assert!(!passes(Some(&metrics(200, 19, 10)), &VIRAL));
        assert!(!passes(Some(&metrics(200, 20, 9)), &VIRAL));
    }

    #[test]
    fn test_missing_metrics_never_pass() {
        assert!(!passes(None, &VIRAL));
        assert!(!passes(
            None,
            &Thresholds {
                min_likes: 1,
                ..Thresholds::default()
            }
        ));
    }

    #[test]
    fn test_apply_keeps_videos_and_order() {
        let video = Item::new(
            CanonicalUrl::new_unchecked("https://www.tiktok.com/@v/video/1".to_string()),
            PlatformRef::ShortVideo,
            "q",
        );
        let items = vec![
            status_item("1", Some(metrics(250, 30, 15))),
            video.clone(),
            status_item("2", Some(metrics(5, 0, 0))),
            status_item("3", None),
            status_item("4", Some(metrics(1000, 100, 100))),
        ];

        let kept = apply_thresholds(items, &VIRAL);
        let urls: Vec<&str> = kept.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.com/u/status/1",
                "https://www.tiktok.com/@v/video/1",
                "https://x.com/u/status/4",
            ]
        );
    }
}
