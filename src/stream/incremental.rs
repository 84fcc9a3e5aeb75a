//! Date-windowed stream

use super::fetch_records;
use super::types::{format_date, DateWindow, StreamDescriptor};
use crate::error::Result;
use crate::http::HttpClient;
use crate::template::{self, TemplateVars};
use crate::types::{JsonValue, Record};
use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Placeholder bound to each visited date
pub const DATE_PLACEHOLDER: &str = "date";

/// Field stamped on every record with the date it was fetched for
pub const DATE_FIELD: &str = "date";

/// Stream issuing one request per date of a [`DateWindow`]
#[derive(Debug, Clone)]
pub struct IncrementalStream {
    client: Arc<HttpClient>,
    descriptor: StreamDescriptor,
    window: DateWindow,
}

impl IncrementalStream {
    /// Create an incremental stream; the endpoint may only use `{date}`
    pub fn new(
        client: Arc<HttpClient>,
        descriptor: StreamDescriptor,
        window: DateWindow,
    ) -> Result<Self> {
        template::validate(descriptor.endpoint(), &[DATE_PLACEHOLDER])?;
        Ok(Self {
            client,
            descriptor,
            window,
        })
    }

    /// Stream descriptor
    pub fn descriptor(&self) -> &StreamDescriptor {
        &self.descriptor
    }

    /// Dates visited by this stream
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Records for every date in the window, ascending, each stamped with `date`
    ///
    /// Requests go out one date at a time as the stream is polled.
    pub fn read_records(&self) -> BoxStream<'_, Record> {
        stream::once(async move {
            info!(
                "Fetching {} from {} to {}...",
                self.descriptor.name(),
                self.window.start(),
                self.window.end()
            );
        })
        .flat_map(move |()| stream::iter(self.window.dates()))
        .then(move |date| self.fetch_date(date))
        .flat_map(stream::iter)
        .boxed()
    }

    async fn fetch_date(&self, date: NaiveDate) -> Vec<Record> {
        let name = self.descriptor.name();
        let date_str = format_date(date);

        let vars = TemplateVars::single(DATE_PLACEHOLDER, date_str.clone());
        let endpoint = match template::render(self.descriptor.endpoint(), &vars) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!("{name}: {e}");
                return Vec::new();
            }
        };

        let Some(mut records) = fetch_records(&self.client, &self.descriptor, &endpoint).await
        else {
            debug!("{name}: no data for {date_str}");
            return Vec::new();
        };

        for record in &mut records {
            record.insert(DATE_FIELD.to_string(), JsonValue::String(date_str.clone()));
        }

        debug!("{name}: {} records for {date_str}", records.len());
        records
    }
}
