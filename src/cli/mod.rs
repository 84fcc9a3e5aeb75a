//! CLI module
//!
//! Command-line interface for the pipeline.
//!
//! # Commands
//!
//! - `extract` - Pull streams from the API into Parquet files
//! - `load` - Load a directory of Parquet files into DuckDB
//! - `run` - Extract, then load
//! - `streams` - List registered streams

mod commands;
mod runner;

pub use commands::{Cli, Commands, ExtractArgs, LoadArgs};
pub use runner::Runner;
