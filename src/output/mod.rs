//! Output module
//!
//! Handles Arrow RecordBatch creation and Parquet file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring Arrow schemas from extracted records
//! - Converting records to Arrow RecordBatches with a loaded-at column
//! - Writing one Parquet file per stream of a run

mod schema;
mod writer;

pub use schema::{infer_schema, loaded_at_type, records_to_batch, LOADED_AT_COLUMN};
pub use writer::{
    write_records, write_result_set, ParquetWriter, ParquetWriterConfig, WrittenFile,
    PARQUET_EXTENSION,
};
