//! Engine types
//!
//! Run configuration and the per-run result set.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, DEFAULT_BASE_URL};
use crate::stream::DateWindow;
use crate::types::{OptionStringExt, Record};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scalar settings for one extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// API base URL
    pub base_url: String,
    /// First date for incremental streams (YYYY-MM-DD), default 7 days ago
    pub start_date: Option<String>,
    /// Last date for incremental streams (YYYY-MM-DD), default today
    pub end_date: Option<String>,
    /// Days between visited dates
    pub step_days: u32,
    /// Attempts per request
    pub max_retries: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Minimum interval between requests in milliseconds
    pub request_delay_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_date: None,
            end_date: None,
            step_days: 1,
            max_retries: 5,
            retry_delay_ms: 2000,
            request_delay_ms: 500,
            timeout_secs: 30,
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the date range
    #[must_use]
    pub fn with_dates(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start_date = start.none_if_empty();
        self.end_date = end.none_if_empty();
        self
    }

    /// Set days between visited dates
    #[must_use]
    pub fn with_step_days(mut self, step_days: u32) -> Self {
        self.step_days = step_days;
        self
    }

    /// Set attempts per request
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set base backoff delay
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set minimum interval between requests
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Check values that would otherwise fail later in the run
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        self.window()?;
        Ok(())
    }

    /// Date window for incremental streams
    pub fn window(&self) -> Result<DateWindow> {
        DateWindow::parse(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.step_days,
        )
    }

    /// HTTP client settings
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .max_retries(self.max_retries)
            .retry_delay(Duration::from_millis(self.retry_delay_ms))
            .request_delay(Duration::from_millis(self.request_delay_ms))
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }
}

/// Records of every stream extracted in one run, in extraction order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    streams: Vec<(String, Vec<Record>)>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a stream's records, replacing an earlier entry of the same name
    pub(crate) fn insert(&mut self, name: impl Into<String>, records: Vec<Record>) {
        let name = name.into();
        match self.streams.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = records,
            None => self.streams.push((name, records)),
        }
    }

    /// Records of one stream
    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.streams
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    /// Whether a stream was extracted
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Stream names in extraction order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().map(|(name, _)| name.as_str())
    }

    /// (name, records) pairs in extraction order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.streams
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no stream was extracted
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Records across all streams
    pub fn total_records(&self) -> usize {
        self.streams.iter().map(|(_, records)| records.len()).sum()
    }
}

impl FromIterator<(String, Vec<Record>)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Record>)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (name, records) in iter {
            results.insert(name, records);
        }
        results
    }
}

impl IntoIterator for ResultSet {
    type Item = (String, Vec<Record>);
    type IntoIter = std::vec::IntoIter<(String, Vec<Record>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.into_iter()
    }
}
