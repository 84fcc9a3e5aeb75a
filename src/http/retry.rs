//! Retry policy as an explicit state machine
//!
//! Each failed attempt is classified into a [`FetchFailure`] and fed to
//! [`RetryPolicy::decide`] together with the zero-based attempt index. The
//! policy answers with the next [`RetryStep`]; the transport never decides
//! on its own whether to sleep or give up.

use std::fmt;
use std::time::Duration;

/// Classification of a single failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// HTTP 404, the resource does not exist
    NotFound,
    /// HTTP 429
    RateLimited,
    /// Any other status, network error, or unreadable body
    Transient(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::NotFound => f.write_str("404 Not Found"),
            FetchFailure::RateLimited => f.write_str("HTTP 429 Rate Limited"),
            FetchFailure::Transient(message) => f.write_str(message),
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Stop now and report "no data"
    Absent,
    /// Sleep for the given delay, then try again
    Retry(Duration),
    /// No attempts left
    Exhausted,
}

/// Retry/backoff policy for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and base delay
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Total number of attempts per request (at least one)
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Base delay
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Decide the next step after `failure` on attempt `attempt` (zero-based)
    pub fn decide(&self, attempt: u32, failure: &FetchFailure) -> RetryStep {
        match failure {
            FetchFailure::NotFound => RetryStep::Absent,
            _ if attempt + 1 >= self.attempts() => RetryStep::Exhausted,
            FetchFailure::RateLimited => RetryStep::Retry(self.rate_limit_backoff(attempt)),
            FetchFailure::Transient(_) => RetryStep::Retry(self.backoff(attempt)),
        }
    }

    /// Standard backoff: `retry_delay * (attempt + 1)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Backoff after a 429: `retry_delay * 2^attempt * 2`
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt).saturating_mul(2);
        self.retry_delay.saturating_mul(factor)
    }
}
