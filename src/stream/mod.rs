//! Stream module
//!
//! A stream is a named unit of extraction producing a lazy, finite sequence
//! of records. Three fetch patterns are supported:
//!
//! - [`SimpleStream`] - one request against a fixed endpoint
//! - [`IncrementalStream`] - one request per date in a [`DateWindow`]
//! - [`DependentStream`] - one request per record of a parent stream
//!
//! [`ExtractStream`] is the closed set of all three. Every stream holds the
//! shared [`HttpClient`] it was built with.

mod dependent;
mod incremental;
mod simple;
mod types;

pub use dependent::DependentStream;
pub use incremental::{IncrementalStream, DATE_FIELD, DATE_PLACEHOLDER};
pub use simple::SimpleStream;
pub use types::{format_date, parse_date, DateWindow, StreamDescriptor, DATE_FORMAT};

use crate::extract::{extract_records, has_data, into_records};
use crate::http::HttpClient;
use crate::types::{Record, StreamKind};
use futures::stream::BoxStream;
use std::sync::Arc;

/// Any stream the orchestrator can run
#[derive(Debug, Clone)]
pub enum ExtractStream {
    /// Single request
    Simple(SimpleStream),
    /// Date-windowed requests
    Incremental(IncrementalStream),
    /// Parent-partitioned requests
    Dependent(DependentStream),
}

impl ExtractStream {
    /// Stream descriptor
    pub fn descriptor(&self) -> &StreamDescriptor {
        match self {
            ExtractStream::Simple(s) => s.descriptor(),
            ExtractStream::Incremental(s) => s.descriptor(),
            ExtractStream::Dependent(s) => s.descriptor(),
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// Fetch pattern
    pub fn kind(&self) -> StreamKind {
        match self {
            ExtractStream::Simple(_) => StreamKind::Simple,
            ExtractStream::Incremental(_) => StreamKind::Incremental,
            ExtractStream::Dependent(_) => StreamKind::Dependent,
        }
    }

    /// Parent stream, for dependent streams
    pub fn parent(&self) -> Option<&Arc<ExtractStream>> {
        match self {
            ExtractStream::Dependent(s) => Some(s.parent()),
            _ => None,
        }
    }

    /// Lazily produce this stream's records
    ///
    /// `parents` is only used by dependent streams, which otherwise read
    /// their parent stream to completion before issuing any request.
    pub fn read_records<'a>(&'a self, parents: Option<&'a [Record]>) -> BoxStream<'a, Record> {
        match self {
            ExtractStream::Simple(s) => s.read_records(),
            ExtractStream::Incremental(s) => s.read_records(),
            ExtractStream::Dependent(s) => s.read_records(parents),
        }
    }
}

impl From<SimpleStream> for ExtractStream {
    fn from(stream: SimpleStream) -> Self {
        ExtractStream::Simple(stream)
    }
}

impl From<IncrementalStream> for ExtractStream {
    fn from(stream: IncrementalStream) -> Self {
        ExtractStream::Incremental(stream)
    }
}

impl From<DependentStream> for ExtractStream {
    fn from(stream: DependentStream) -> Self {
        ExtractStream::Dependent(stream)
    }
}

/// GET `endpoint` and extract the descriptor's record set
///
/// `None` when the client reported no data or the body was empty.
async fn fetch_records(
    client: &HttpClient,
    descriptor: &StreamDescriptor,
    endpoint: &str,
) -> Option<Vec<Record>> {
    let body = client.get(endpoint).await?;
    if !has_data(&body) {
        return None;
    }
    let values = extract_records(&body, descriptor.field_path());
    Some(into_records(descriptor.name(), values))
}

#[cfg(test)]
mod tests;
