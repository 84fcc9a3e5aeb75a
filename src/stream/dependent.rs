//! Parent-partitioned stream

use super::types::StreamDescriptor;
use super::{fetch_records, ExtractStream};
use crate::error::Result;
use crate::http::HttpClient;
use crate::template::{self, TemplateVars};
use crate::types::{JsonValue, Record};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Stream issuing one request per parent record
///
/// Each parent record contributes the value under `parent_key` as a
/// partition. The endpoint's `{partition_field}` placeholder is bound to that
/// value and every record fetched for it is stamped with
/// `partition_field = value`.
#[derive(Debug, Clone)]
pub struct DependentStream {
    client: Arc<HttpClient>,
    descriptor: StreamDescriptor,
    parent: Arc<ExtractStream>,
    parent_key: String,
    partition_field: String,
}

impl DependentStream {
    /// Create a dependent stream; the endpoint may only use `{partition_field}`
    pub fn new(
        client: Arc<HttpClient>,
        descriptor: StreamDescriptor,
        parent: Arc<ExtractStream>,
        parent_key: impl Into<String>,
        partition_field: impl Into<String>,
    ) -> Result<Self> {
        let partition_field = partition_field.into();
        template::validate(descriptor.endpoint(), &[partition_field.as_str()])?;
        Ok(Self {
            client,
            descriptor,
            parent,
            parent_key: parent_key.into(),
            partition_field,
        })
    }

    /// Stream descriptor
    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    /// Parent stream supplying the partitions
    pub fn parent(&self) -> &Arc<ExtractStream> {
        &self.parent
    }

    /// Key read from each parent record
    pub fn parent_key(&self) -> &str {
        &self.parent_key
    }

    /// Placeholder and stamped field name
    pub fn partition_field(&self) -> &str {
        &self.partition_field
    }

    /// Records for every parent partition
    ///
    /// Without `parents`, the parent stream is read to completion first.
    pub fn read_records<'a>(&'a self, parents: Option<&'a [Record]>) -> BoxStream<'a, Record> {
        stream::once(self.partitions(parents))
            .flat_map(move |partitions| {
                stream::iter(partitions)
                    .then(move |value| self.fetch_partition(value))
                    .flat_map(stream::iter)
            })
            .boxed()
    }

    /// Partition values taken from `parents`, in order
    ///
    /// Parent records without the key (or with `null`) are skipped.
    pub fn partition_values(&self, parents: &[Record]) -> Vec<JsonValue> {
        let values: Vec<JsonValue> = parents
            .iter()
            .filter_map(|record| match record.get(&self.parent_key) {
                None | Some(JsonValue::Null) => None,
                Some(value) => Some(value.clone()),
            })
            .collect();

        let skipped = parents.len() - values.len();
        if skipped > 0 {
            debug!(
                "{}: skipped {skipped} parent record(s) without '{}'",
                self.descriptor.name(),
                self.parent_key
            );
        }
        values
    }

    async fn partitions(&self, parents: Option<&[Record]>) -> Vec<JsonValue> {
        info!(
            "Fetching {} (depends on {})...",
            self.descriptor.name(),
            self.parent.name()
        );

        match parents {
            Some(records) => self.partition_values(records),
            None => {
                let records: Vec<Record> = self.parent.read_records(None).collect().await;
                self.partition_values(&records)
            }
        }
    }

    async fn fetch_partition(&self, value: JsonValue) -> Vec<Record> {
        let name = self.descriptor.name();

        let vars = TemplateVars::single(self.partition_field.clone(), value.clone());
        let endpoint = match template::render(self.descriptor.endpoint(), &vars) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!("{name}: {e}");
                return Vec::new();
            }
        };

        let Some(mut records) = fetch_records(&self.client, &self.descriptor, &endpoint).await
        else {
            debug!(
                "{name}: no data for {}={}",
                self.partition_field,
                template::value_to_string(&value)
            );
            return Vec::new();
        };

        for record in &mut records {
            record.insert(self.partition_field.clone(), value.clone());
        }
        records
    }
}
