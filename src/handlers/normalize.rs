use url::Url;

/// Query parameters that only carry share/tracking state.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid",
    "gclid",
    "igshid",
    "ref",
    "ref_src",
    "ref_url",
    "is_from_webapp",
    "sender_device",
];

/// Normalize a URL so equivalent spellings compare equal.
///
/// Forces https, lowercases the host, drops default ports, tracking query
/// parameters, the fragment and any non-root trailing slash. Input that does
/// not parse as an http(s) URL is returned unchanged.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let Some(mut parsed) = parse_http(url) else {
        return url.to_string();
    };

    if parsed.scheme() == "http" {
        let _ = parsed.set_scheme("https");
    }
    // The url crate already lowercases hosts; ports need explicit handling
    // because 80 is not the default for https.
    if matches!(parsed.port(), Some(80 | 443)) {
        let _ = parsed.set_port(None);
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.set_fragment(None);

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

/// Replace the host of `url` with `canonical` when it is one of `aliases`.
///
/// Matching is case-insensitive. Unparseable input is returned unchanged.
#[must_use]
pub fn collapse_host(url: &str, aliases: &[&str], canonical: &str) -> String {
    let Some(mut parsed) = parse_http(url) else {
        return url.to_string();
    };

    let is_alias = parsed
        .host_str()
        .is_some_and(|host| aliases.iter().any(|a| a.eq_ignore_ascii_case(host)));
    if is_alias && parsed.set_host(Some(canonical)).is_ok() {
        return parsed.to_string();
    }

    url.to_string()
}

/// Drop the query parameters named in `params` (case-insensitive).
///
/// For site-specific share parameters too generic to strip on every host.
/// Unparseable input is returned unchanged.
#[must_use]
pub fn strip_query_params(url: &str, params: &[&str]) -> String {
    let Some(mut parsed) = parse_http(url) else {
        return url.to_string();
    };
    if parsed.query().is_none() {
        return url.to_string();
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|p| p.eq_ignore_ascii_case(key)))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.to_string()
}

fn parse_http(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(parsed)
}

fn is_tracking_param(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.starts_with("utm_") || TRACKING_PARAMS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_https() {
        assert_eq!(
            normalize_url("http://x.com/a/status/1"),
            "https://x.com/a/status/1"
        );
    }

    #[test]
    fn test_lowercase_host() {
        assert_eq!(
            normalize_url("https://X.COM/Someone/status/1"),
            "https://x.com/Someone/status/1"
        );
    }

    #[test]
    fn test_strip_tracking_params() {
        assert_eq!(
            normalize_url("https://x.com/a/status/1?utm_source=share&fbclid=abc"),
            "https://x.com/a/status/1"
        );
        assert_eq!(
            normalize_url("https://www.tiktok.com/@a/video/9?is_from_webapp=1&utm_source=copy"),
            "https://www.tiktok.com/@a/video/9"
        );
    }

    #[test]
    fn test_keep_meaningful_params() {
        assert_eq!(
            normalize_url("https://example.com/search?q=meme&page=2"),
            "https://example.com/search?q=meme&page=2"
        );
    }

    #[test]
    fn test_short_generic_params_survive() {
        // `s` and `t` only mean share state on X
        assert_eq!(
            normalize_url("https://example.com/page?s=foo&t=10&lang=de"),
            "https://example.com/page?s=foo&t=10&lang=de"
        );
        assert_ne!(
            normalize_url("https://example.com/page?s=foo"),
            normalize_url("https://example.com/page?s=bar")
        );
    }

    #[test]
    fn test_strip_query_params() {
        assert_eq!(
            strip_query_params("https://x.com/a/status/1?S=20&t=abc&keep=1", &["s", "t"]),
            "https://x.com/a/status/1?keep=1"
        );
        assert_eq!(
            strip_query_params("https://x.com/a/status/1?s=20", &["s"]),
            "https://x.com/a/status/1"
        );
        assert_eq!(strip_query_params("not a url", &["s"]), "not a url");
    }

    #[test]
    fn test_remove_fragment_and_trailing_slash() {
        assert_eq!(
            normalize_url("https://x.com/a/status/1/#m"),
            "https://x.com/a/status/1"
        );
        assert_eq!(normalize_url("https://x.com/"), "https://x.com/");
    }

    #[test]
    fn test_remove_default_port() {
        assert_eq!(
            normalize_url("https://x.com:443/a/status/1"),
            "https://x.com/a/status/1"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url("mailto:a@b.c"), "mailto:a@b.c");
    }

    #[test]
    fn test_collapse_host() {
        let aliases = ["twitter.com", "www.twitter.com"];
        assert_eq!(
            collapse_host("https://www.twitter.com/a/status/1", &aliases, "x.com"),
            "https://x.com/a/status/1"
        );
        assert_eq!(
            collapse_host("https://example.com/a", &aliases, "x.com"),
            "https://example.com/a"
        );
    }
}
