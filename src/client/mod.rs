//! HTTP execution with rate-limit aware retries.

mod backoff;
mod error;

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Request, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

pub use backoff::{parse_retry_after, Backoff, DelayRange, RetryPolicy};
pub use error::{truncate_body, FetchError};

use crate::constants::{ERROR_BODY_LIMIT, USER_AGENT};

/// Executes requests, backing off and retrying on 429 responses.
///
/// Clones share the underlying connection pool. Backoff state is scoped to a
/// single [`execute`](Self::execute) call.
#[derive(Debug, Clone)]
pub struct RateLimitedClient {
    client: Client,
    policy: RetryPolicy,
    /// Pause owed after each successful response, for backends with a fixed quota.
    courtesy: DelayRange,
}

impl RateLimitedClient {
    /// Create a client with the given per-request timeout and retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration, policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            policy,
            courtesy: DelayRange::ZERO,
        })
    }

    /// Owe a random delay from `range` after each successful response.
    ///
    /// [`execute`](Self::execute) does not sleep it; callers wait
    /// [`courtesy_delay`](Self::courtesy_delay) once they have used the body.
    #[must_use]
    pub fn with_courtesy_delay(mut self, range: DelayRange) -> Self {
        self.courtesy = range;
        self
    }

    /// Draw the pause owed after a successful response.
    #[must_use]
    pub fn courtesy_delay(&self) -> Duration {
        self.courtesy.sample()
    }

    /// Underlying HTTP client, for building requests.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `request` and return the response body on success.
    ///
    /// # Errors
    ///
    /// - [`FetchError::RateLimitExceeded`] when every attempt got a 429.
    /// - [`FetchError::Status`] for any other non-success status (no retry).
    /// - [`FetchError::Transport`] when the request could not be completed.
    pub async fn execute(&self, request: Request) -> Result<String, FetchError> {
        let attempts = self.policy.max_retries.max(1);
        let mut backoff = Backoff::new(&self.policy);
        let url = request.url().clone();

        for attempt in 1..=attempts {
            let req = request.try_clone().ok_or(FetchError::NotReplayable)?;
            debug!(url = %url, attempt, "Sending request");

            let response = self.client.execute(req).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt == attempts {
                    break;
                }
                let hint = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_retry_after);
                let wait = backoff.next_delay(hint) + self.policy.jitter.sample();
                warn!(
                    url = %url,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    server_hint = hint.is_some(),
                    "Rate limited, backing off"
                );
                sleep(wait).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            debug!(url = %url, status = status.as_u16(), "Request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, ERROR_BODY_LIMIT),
            });
        }

        warn!(url = %url, attempts, "Rate limit retries exhausted");
        Err(FetchError::RateLimitExceeded { attempts })
    }
}
