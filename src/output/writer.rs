//! Parquet file writer
//!
//! Writes stream records to one Parquet file per stream.

use super::schema::records_to_batch;
use crate::engine::ResultSet;
use crate::error::{Error, Result};
use crate::types::Record;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File extension of staged stream files
pub const PARQUET_EXTENSION: &str = "parquet";

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024,
            dictionary_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compression algorithm
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Get row group size
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Get dictionary encoding enabled
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set compression by name: `snappy`, `zstd`, `gzip`, `lz4` or `none`
    pub fn with_compression_name(self, name: &str) -> Result<Self> {
        let compression = match name.trim().to_ascii_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4_RAW,
            "none" | "uncompressed" => Compression::UNCOMPRESSED,
            other => {
                return Err(Error::invalid_value(
                    "compression",
                    format!("unsupported codec '{other}'"),
                ))
            }
        };
        Ok(self.with_compression(compression))
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .set_dictionary_enabled(self.dictionary_enabled)
            .build()
    }
}

/// Parquet file writer
pub struct ParquetWriter {
    /// Arrow writer
    writer: ArrowWriter<File>,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::Output {
            message: format!("Failed to create {}: {e}", path.display()),
        })?;

        let props = config.build_properties();
        let writer =
            ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props)).map_err(|e| {
                Error::Output {
                    message: format!("Failed to create Parquet writer: {e}"),
                }
            })?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }
}

/// A Parquet file produced for one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Stream name, also the file stem
    pub stream: String,
    /// Path of the written file
    pub path: PathBuf,
    /// Rows written
    pub rows: usize,
}

/// Write records to a single Parquet file
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[Record],
    loaded_at: DateTime<Utc>,
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let batch = records_to_batch(records, loaded_at)?;
    let mut writer = ParquetWriter::new(path, batch.schema().as_ref(), config)?;
    writer.write(&batch)?;
    writer.close()
}

/// Write every non-empty stream of a run to `<dir>/<stream>.parquet`
///
/// All files share one loaded-at timestamp. Streams without records are
/// skipped.
pub fn write_result_set(
    results: &ResultSet,
    dir: impl AsRef<Path>,
    config: &ParquetWriterConfig,
) -> Result<Vec<WrittenFile>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| Error::Output {
        message: format!("Failed to create output directory {}: {e}", dir.display()),
    })?;

    let loaded_at = Utc::now();
    let mut written = Vec::new();

    for (stream, records) in results.iter() {
        if records.is_empty() {
            warn!("No records for {stream}, skipping...");
            continue;
        }

        let path = dir.join(format!("{stream}.{PARQUET_EXTENSION}"));
        let rows = write_records(&path, records, loaded_at, config)?;
        info!("Saved {rows} records to {}", path.display());

        written.push(WrittenFile {
            stream: stream.to_string(),
            path,
            rows,
        });
    }

    Ok(written)
}
