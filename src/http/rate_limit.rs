//! Cooperative request pacing
//!
//! Keeps a minimum interval between the start of consecutive requests.
//! The pacer remembers when the last attempt started and, before the next
//! request, sleeps whatever is left of the interval.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Minimum-interval pacer shared by every request of one client
#[derive(Debug, Default)]
pub struct RequestPacer {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// Create a pacer with the given minimum interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Create a pacer that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Minimum interval between requests
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the pacer ever waits
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Start time of the most recent request, if any
    pub fn last_request(&self) -> Option<Instant> {
        *self.lock()
    }

    /// Time left before the next request may start
    pub fn remaining(&self) -> Duration {
        match self.last_request() {
            Some(last) => self.interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the interval since the last request has passed
    ///
    /// Returns the time slept.
    pub async fn wait(&self) -> Duration {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
        remaining
    }

    /// Record that a request is starting now
    pub fn mark(&self) {
        *self.lock() = Some(Instant::now());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
