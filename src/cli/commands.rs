//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// NHL API to Parquet to DuckDB pipeline
#[derive(Parser, Debug)]
#[command(name = "nhl-pipeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract streams to Parquet files
    Extract(ExtractArgs),

    /// Load Parquet files into DuckDB
    Load(LoadArgs),

    /// Extract streams, then load them into DuckDB
    Run {
        #[command(flatten)]
        extract: ExtractArgs,

        /// DuckDB database file
        #[arg(long)]
        database: Option<PathBuf>,

        /// Force full replace for all tables
        #[arg(long)]
        drop_tables: bool,
    },

    /// List registered streams
    Streams,
}

/// Extraction flags; unset flags fall back to the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Start date in YYYY-MM-DD format (default: 7 days ago)
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date in YYYY-MM-DD format (default: today)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Directory to save Parquet files (default: ./data)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip dependent streams
    #[arg(long)]
    pub no_dependent: bool,

    /// Delay between API requests in seconds (default: 1.0)
    #[arg(long)]
    pub request_delay: Option<f64>,

    /// Attempts per request
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Base retry delay in seconds
    #[arg(long)]
    pub retry_delay: Option<f64>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Streams to extract (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    pub streams: Vec<String>,
}

/// Load flags; unset flags fall back to the config file
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Directory containing Parquet files (default: ./data)
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// DuckDB database file (default: ./nhl.duckdb)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Force full replace for all tables
    #[arg(long)]
    pub drop_tables: bool,
}
