//! Backoff bookkeeping for rate-limited retries.

use std::time::Duration;

use rand::{thread_rng, Rng};

/// Inclusive range a random delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const ZERO: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    #[must_use]
    pub const fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    /// Draw a uniformly distributed delay from the range.
    ///
    /// A degenerate or inverted range always yields `min`.
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        thread_rng().gen_range(self.min..=self.max)
    }
}

/// Retry settings for [`super::RateLimitedClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_retries: u32,
    /// First backoff value when the server gives no hint.
    pub base_backoff: Duration,
    /// Cap for both the exponential value and server hints.
    pub max_backoff: Duration,
    /// Random extra wait added to every backoff.
    pub jitter: DelayRange,
}

impl RetryPolicy {
    /// One attempt, no backoff. Used for best-effort lookups.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_retries: 1,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: DelayRange::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 6,
            base_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(30),
            jitter: DelayRange::from_millis(200, 800),
        }
    }
}

/// Exponential backoff state for one logical request.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            current: policy.base_backoff.min(policy.max_backoff),
            max: policy.max_backoff,
        }
    }

    /// Delay before the next attempt, excluding jitter.
    ///
    /// A server hint replaces the exponential value for this step only; the
    /// exponential value still doubles so later unhinted waits keep growing.
    pub fn next_delay(&mut self, hint: Option<Duration>) -> Duration {
        let wait = hint.unwrap_or(self.current).min(self.max);
        self.current = self.current.saturating_mul(2).min(self.max);
        wait
    }
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored and fall back to exponential backoff.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok().map(Duration::from_secs)
}
