//! Stream descriptors and date windows

use crate::error::{Error, Result};
use chrono::{Duration, Local, NaiveDate};

/// Format of the `{date}` placeholder and the stamped `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Immutable description of one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    name: String,
    endpoint: String,
    field_path: Vec<String>,
}

impl StreamDescriptor {
    /// Create a descriptor; `field_path` may be empty
    pub fn new<I, S>(name: impl Into<String>, endpoint: impl Into<String>, field_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            field_path: field_path.into_iter().map(Into::into).collect(),
        }
    }

    /// Stream name (also the output table name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint template, relative to the client's base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Keys leading to the record set in each response
    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }
}

/// Inclusive range of calendar dates visited by an incremental stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
    step_days: u32,
}

impl DateWindow {
    /// Create a window; `step_days` must be at least 1
    pub fn new(start: NaiveDate, end: NaiveDate, step_days: u32) -> Result<Self> {
        if step_days == 0 {
            return Err(Error::invalid_value("step_days", "must be at least 1"));
        }
        Ok(Self {
            start,
            end,
            step_days,
        })
    }

    /// Parse optional `YYYY-MM-DD` bounds
    ///
    /// Missing end means today, missing start means seven days before today.
    pub fn parse(start: Option<&str>, end: Option<&str>, step_days: u32) -> Result<Self> {
        let today = Local::now().date_naive();
        let end = match end {
            Some(s) => parse_date("end_date", s)?,
            None => today,
        };
        let start = match start {
            Some(s) => parse_date("start_date", s)?,
            None => today - Duration::days(7),
        };
        Self::new(start, end, step_days)
    }

    /// First date
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date (inclusive)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Step between visited dates
    pub fn step_days(&self) -> u32 {
        self.step_days
    }

    /// Visited dates in ascending order; empty when `end < start`
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let step = Duration::days(i64::from(self.step_days));
        std::iter::successors(Some(self.start), move |date| date.checked_add_signed(step))
            .take_while(move |date| *date <= end)
    }
}

/// Parse a `YYYY-MM-DD` config value
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| {
            Error::invalid_value(field, format!("'{value}' is not a YYYY-MM-DD date: {e}"))
        })
}

/// Render a date the way the API expects it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
