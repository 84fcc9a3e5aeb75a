//! Single-request stream

use super::fetch_records;
use super::types::StreamDescriptor;
use crate::error::Result;
use crate::http::HttpClient;
use crate::template;
use crate::types::Record;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::info;

/// Stream backed by one GET against a fixed endpoint
#[derive(Debug, Clone)]
pub struct SimpleStream {
    client: Arc<HttpClient>,
    descriptor: StreamDescriptor,
}

impl SimpleStream {
    /// Create a simple stream; its endpoint must not contain placeholders
    pub fn new(client: Arc<HttpClient>, descriptor: StreamDescriptor) -> Result<Self> {
        template::validate(descriptor.endpoint(), &[])?;
        Ok(Self { client, descriptor })
    }

    /// Stream descriptor
    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    /// Records from the single response, unmodified
    pub fn read_records(&self) -> BoxStream<'_, Record> {
        stream::once(self.fetch()).flat_map(stream::iter).boxed()
    }

    async fn fetch(&self) -> Vec<Record> {
        let name = self.descriptor.name();
        info!("Fetching {name}...");

        let records = fetch_records(&self.client, &self.descriptor, self.descriptor.endpoint())
            .await
            .unwrap_or_default();

        info!("Retrieved {} records from {name}", records.len());
        records
    }
}
