//! Search backends that turn a query into candidate post URLs.
//!
//! Two interchangeable implementations exist: [`BraveSearch`] talks to a JSON
//! search API, [`NitterSearch`] scrapes a rendered results page. Both go
//! through [`RateLimitedClient`] and deduplicate their own output.

mod brave;
mod nitter;

use std::time::Duration;

use async_trait::async_trait;

pub use brave::{extract_result_urls, BraveSearch};
pub use nitter::{extract_status_links, NitterSearch};

use crate::client::{FetchError, RateLimitedClient};
use crate::config::{BackendKind, Config};

/// A source of raw result URLs for a query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Return up to `count` unique URLs in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the query, keeps rate limiting
    /// past the retry budget, or answers with an unreadable payload.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, FetchError>;

    /// Pause owed after a successful search, before the next one may start.
    fn courtesy_delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Build the backend selected in `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn backend_from_config(config: &Config) -> Result<Box<dyn SearchBackend>, FetchError> {
    let client = RateLimitedClient::new(config.request_timeout, config.retry_policy())?;

    let backend: Box<dyn SearchBackend> = match config.backend {
        BackendKind::Brave => Box::new(BraveSearch::new(
            client.with_courtesy_delay(config.courtesy_delay),
            config.brave_api_url.clone(),
            config.brave_api_key.clone().unwrap_or_default(),
        )),
        BackendKind::Nitter => Box::new(NitterSearch::new(client, config.nitter_url.clone())),
    };

    Ok(backend)
}
