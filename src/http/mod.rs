//! HTTP client module
//!
//! Provides the API client with retry, backoff, and request pacing.
//!
//! # Features
//!
//! - **Automatic Retries**: attempt budget and backoff from [`RetryPolicy`]
//! - **Request Pacing**: minimum interval between requests via [`RequestPacer`]
//! - **No-data Signal**: 404 and exhausted retries come back as `None`

mod client;
mod rate_limit;
mod retry;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, DEFAULT_BASE_URL,
};
pub use rate_limit::RequestPacer;
pub use retry::{FetchFailure, RetryPolicy, RetryStep};
