//! The fetch pipeline: search, classify, enrich, then aggregate.

mod report;

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use report::{build_report, query_error, unfinished_query};

use crate::client::{DelayRange, FetchError, RateLimitedClient, RetryPolicy};
use crate::config::Config;
use crate::filter::Thresholds;
use crate::handlers::{classify, Classified};
use crate::metrics::MetricsEnricher;
use crate::models::{Item, Metrics, RunReport};
use crate::search::{backend_from_config, SearchBackend};

const DEADLINE_EXCEEDED: &str = "run deadline exceeded";
const CANCELLED: &str = "run cancelled";

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// How many results to ask the backend for per query.
    pub results_per_query: usize,
    pub enrich_metrics: bool,
    /// Pause after each metrics lookup.
    pub enrich_delay: Duration,
    /// Pause between consecutive queries.
    pub inter_query_delay: DelayRange,
    pub thresholds: Option<Thresholds>,
    pub max_items: Option<usize>,
    /// Overall budget for the run, measured from its start.
    pub deadline: Option<Duration>,
}

impl RunOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            results_per_query: config.results_per_query,
            enrich_metrics: config.enrich_metrics,
            enrich_delay: config.enrich_delay,
            inter_query_delay: config.inter_query_delay,
            thresholds: config.thresholds,
            max_items: config.max_items,
            deadline: config.run_deadline,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            results_per_query: 20,
            enrich_metrics: true,
            enrich_delay: Duration::ZERO,
            inter_query_delay: DelayRange::ZERO,
            thresholds: None,
            max_items: None,
            deadline: None,
        }
    }
}

/// Why a run stopped before its last query.
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Deadline,
    Cancelled,
}

impl Interrupt {
    const fn reason(self) -> &'static str {
        match self {
            Self::Deadline => DEADLINE_EXCEEDED,
            Self::Cancelled => CANCELLED,
        }
    }
}

/// Runs queries one at a time against a single backend.
pub struct Pipeline {
    backend: Box<dyn SearchBackend>,
    enricher: MetricsEnricher,
    options: RunOptions,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        backend: Box<dyn SearchBackend>,
        enricher: MetricsEnricher,
        options: RunOptions,
    ) -> Self {
        Self {
            backend,
            enricher,
            options,
        }
    }

    /// Build the backend, enricher and options described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let backend = backend_from_config(config)?;
        let metrics_client =
            RateLimitedClient::new(config.request_timeout, RetryPolicy::single_attempt())?;
        let enricher = MetricsEnricher::new(metrics_client, config.metrics_url.clone());

        Ok(Self::new(backend, enricher, RunOptions::from_config(config)))
    }

    /// Run every query and produce the report.
    ///
    /// Per-query failures are recorded in the report, never returned. When the
    /// deadline passes or `shutdown` fires, the current wait is abandoned, the
    /// items gathered so far are kept and every unfinished query is recorded as
    /// a transient error.
    pub async fn run(&self, queries: &[String], shutdown: CancellationToken) -> RunReport {
        let started_at = Utc::now();
        let deadline = self.options.deadline.map(|d| Instant::now() + d);

        let mut items = Vec::new();
        let mut errors = Vec::new();
        let mut metrics_cache = HashMap::new();

        info!(
            queries = queries.len(),
            backend = self.backend.name(),
            "Starting run"
        );

        for (index, query) in queries.iter().enumerate() {
            let outcome = tokio::select! {
                biased;
                () = shutdown.cancelled() => Err(Interrupt::Cancelled),
                () = wait_for(deadline) => Err(Interrupt::Deadline),
                result = self.process_query(query, &mut items, &mut metrics_cache) => Ok(result),
            };

            // Only a successful search owes the backend a courtesy pause
            let owed = match outcome {
                Ok(Ok(())) => self.backend.courtesy_delay(),
                Ok(Err(e)) => {
                    warn!(query = %query, error = %e, kind = ?e.kind(), "Query failed");
                    errors.push(query_error(query, &e));
                    Duration::ZERO
                }
                Err(interrupt) => {
                    warn!(
                        remaining = queries.len() - index,
                        reason = interrupt.reason(),
                        "Run interrupted"
                    );
                    errors.extend(
                        queries[index..]
                            .iter()
                            .map(|q| unfinished_query(q, interrupt.reason())),
                    );
                    break;
                }
            };

            if index + 1 < queries.len() {
                self.pause_between_queries(owed, deadline, &shutdown).await;
            }
        }

        let report = build_report(
            started_at,
            queries,
            items,
            errors,
            self.options.thresholds.as_ref(),
            self.options.max_items,
        );
        info!(
            items = report.items.len(),
            matched = report.count,
            errors = report.errors.len(),
            "Run complete"
        );
        report
    }

    /// Search one query and push its items as they are produced, so an
    /// interrupted query still contributes what it already found.
    async fn process_query(
        &self,
        query: &str,
        items: &mut Vec<Item>,
        metrics_cache: &mut HashMap<String, Option<Metrics>>,
    ) -> Result<(), FetchError> {
        debug!(query = %query, "Running query");
        let urls = self
            .backend
            .search(query, self.options.results_per_query)
            .await?;

        for raw in urls {
            let Classified { url, platform } = classify(&raw);
            let platform_id = platform.platform_id().map(str::to_owned);
            let item = Item::new(url, platform, query);

            let item = match platform_id {
                Some(id) if self.options.enrich_metrics => {
                    let metrics = self.enrich_cached(&id, metrics_cache).await;
                    item.with_metrics(metrics)
                }
                _ => item,
            };
            items.push(item);
        }

        Ok(())
    }

    /// Each platform id is looked up at most once per run.
    async fn enrich_cached(
        &self,
        platform_id: &str,
        cache: &mut HashMap<String, Option<Metrics>>,
    ) -> Option<Metrics> {
        if let Some(cached) = cache.get(platform_id) {
            return cached.clone();
        }

        let metrics = self.enricher.enrich(platform_id).await;
        cache.insert(platform_id.to_string(), metrics.clone());

        if !self.options.enrich_delay.is_zero() {
            sleep(self.options.enrich_delay).await;
        }
        metrics
    }

    /// Wait out the backend's courtesy delay plus the inter-query pacing.
    /// Items of the finished query are already collected, so an interrupt
    /// here loses nothing.
    async fn pause_between_queries(
        &self,
        owed: Duration,
        deadline: Option<Instant>,
        shutdown: &CancellationToken,
    ) {
        let delay = owed + self.options.inter_query_delay.sample();
        if delay.is_zero() {
            return;
        }

        tokio::select! {
            () = sleep(delay) => {}
            () = wait_for(deadline) => {}
            () = shutdown.cancelled() => {}
        }
    }
}

/// Resolves at `deadline`, or never.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
