//! Warehouse module
//!
//! Loads staged Parquet files into a DuckDB database.
//!
//! # Overview
//!
//! Each `<table>.parquet` file in a directory becomes (or extends) the table
//! `<table>`. A [`LoadPolicy`] decides per table whether the file replaces
//! the table or is appended to it.

mod loader;

pub use loader::{
    parquet_files, validate_table_name, LoadPolicy, LoadReport, WarehouseLoader,
    DEFAULT_FULL_REPLACE_TABLES, IN_MEMORY,
};
