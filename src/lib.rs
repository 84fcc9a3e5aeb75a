// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # nhl-pipeline
//!
//! Stream-based extraction from the NHL web API, staged as Parquet and
//! loaded into DuckDB.
//!
//! ## Features
//!
//! - **Three stream shapes**: single request, one request per date, one
//!   request per parent record
//! - **Resilient HTTP**: retries with linear backoff, doubled exponential
//!   backoff on 429, absent-on-404, and a minimum gap between requests
//! - **Parquet staging**: one file per stream with a shared load timestamp
//! - **DuckDB loading**: full replace or incremental append per table
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nhl_pipeline::{Extractor, ExtractorConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ExtractorConfig::new()
//!         .with_dates(Some("2024-11-01".into()), Some("2024-11-07".into()));
//!     let extractor = Extractor::new(&config)?;
//!
//!     let results = extractor.extract_all(true).await?;
//!     for (stream, records) in results.iter() {
//!         println!("{stream}: {} records", records.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Extractor (engine)                      │
//! │   simple streams → incremental streams → dependents      │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//! ┌──────────────┬────────────┴──────┬──────────────┬──────────────┐
//! │   Streams    │       HTTP        │    Output    │  Warehouse   │
//! ├──────────────┼───────────────────┼──────────────┼──────────────┤
//! │ Simple       │ Retry policy      │ Arrow        │ DuckDB       │
//! │ Incremental  │ Request pacing    │ Parquet      │ Replace      │
//! │ Dependent    │ 404 → absent      │              │ Append       │
//! └──────────────┴───────────────────┴──────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Endpoint template rendering
pub mod template;

/// HTTP client with retry and request pacing
pub mod http;

/// Field-path record extraction
pub mod extract;

/// Stream variants
pub mod stream;

/// Extraction orchestrator and stream catalog
pub mod engine;

/// Arrow/Parquet output
pub mod output;

/// DuckDB loading
pub mod warehouse;

/// Pipeline configuration file
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use engine::{Extractor, ExtractorConfig, ResultSet};
pub use error::{Error, Result};
pub use http::{HttpClient, HttpClientConfig};
pub use stream::{DateWindow, ExtractStream};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
