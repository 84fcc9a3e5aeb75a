//! Extraction engine module
//!
//! Stream registration and run orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Extractor` - Owns the shared client and the registered streams
//! - `ExtractorConfig` - Scalar settings for a run
//! - `ResultSet` - Records per stream, in extraction order
//! - `catalog` - The NHL stream catalog
//!
//! A full run extracts simple streams, then incremental streams, then
//! dependent streams. A dependent stream whose parent was extracted earlier
//! in the same run reuses those records instead of refetching the parent.

pub mod catalog;
mod types;

pub use types::{ExtractorConfig, ResultSet};

use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::stream::ExtractStream;
use crate::types::{Record, StreamKind};
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Stream extractor
#[derive(Debug)]
pub struct Extractor {
    /// Shared HTTP client
    client: Arc<HttpClient>,
    /// Streams in registration order
    streams: Vec<Arc<ExtractStream>>,
}

impl Extractor {
    /// Create an extractor with the NHL catalog
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let client = Arc::new(HttpClient::with_config(config.http_config())?);
        let streams = catalog::nhl_streams(&client, config.window()?)?;
        Self::with_streams(client, streams)
    }

    /// Create an extractor over an explicit stream list
    ///
    /// Names must be unique and every dependent stream's parent must be
    /// registered before it.
    pub fn with_streams(client: Arc<HttpClient>, streams: Vec<Arc<ExtractStream>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for stream in &streams {
            if let Some(parent) = stream.parent() {
                if !seen.contains(parent.name()) {
                    return Err(Error::config(format!(
                        "Stream '{}' depends on '{}', which is not registered before it",
                        stream.name(),
                        parent.name()
                    )));
                }
            }
            if !seen.insert(stream.name()) {
                return Err(Error::config(format!(
                    "Duplicate stream name: {}",
                    stream.name()
                )));
            }
        }

        Ok(Self { client, streams })
    }

    /// Shared HTTP client
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Registered streams in registration order
    pub fn streams(&self) -> impl Iterator<Item = &Arc<ExtractStream>> {
        self.streams.iter()
    }

    /// Registered stream names in registration order
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.iter().map(|s| s.name()).collect()
    }

    /// Look up a stream by name
    pub fn stream(&self, name: &str) -> Result<&Arc<ExtractStream>> {
        self.streams
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::unknown_stream(name))
    }

    /// Extract one stream to completion
    ///
    /// `parents` only matters for dependent streams; without it the parent
    /// stream is read first.
    pub async fn extract_stream(
        &self,
        name: &str,
        parents: Option<&[Record]>,
    ) -> Result<Vec<Record>> {
        let stream = self.stream(name)?;
        Ok(stream.read_records(parents).collect().await)
    }

    /// Extract every registered stream
    ///
    /// With `include_dependent` false, dependent streams are skipped.
    pub async fn extract_all(&self, include_dependent: bool) -> Result<ResultSet> {
        let names: Vec<&str> = self
            .streams
            .iter()
            .filter(|s| include_dependent || s.kind() != StreamKind::Dependent)
            .map(|s| s.name())
            .collect();
        self.extract_selected(names.as_slice()).await
    }

    /// Extract the named streams in run order
    ///
    /// Every name is resolved before any request is issued.
    pub async fn extract_selected<S: AsRef<str>>(&self, names: &[S]) -> Result<ResultSet> {
        let selected = names
            .iter()
            .map(|name| self.stream(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let start = Instant::now();
        let mut results = ResultSet::new();

        for kind in [StreamKind::Simple, StreamKind::Incremental, StreamKind::Dependent] {
            let group: Vec<&Arc<ExtractStream>> = self
                .streams
                .iter()
                .filter(|s| s.kind() == kind)
                .filter(|s| selected.iter().any(|sel| Arc::ptr_eq(sel, s)))
                .collect();
            if group.is_empty() {
                continue;
            }

            info!("Extracting {kind} streams...");
            for stream in group {
                let parents = stream.parent().and_then(|p| results.get(p.name()));
                let records: Vec<Record> = stream.read_records(parents).collect().await;
                info!("{}: {} records", stream.name(), records.len());
                results.insert(stream.name(), records);
            }
        }

        info!(
            "Extraction complete: {} streams, {} records in {:.1}s",
            results.len(),
            results.total_records(),
            start.elapsed().as_secs_f64()
        );
        Ok(results)
    }
}
