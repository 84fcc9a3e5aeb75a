//! Pipeline configuration file
//!
//! A YAML document with one section per pipeline stage. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! ```yaml
//! extract:
//!   start_date: "2024-11-01"
//!   end_date: "2024-11-07"
//!   request_delay_ms: 1000
//! include_dependent: true
//! streams: [games, game_boxscore]
//! output:
//!   directory: ./data
//!   compression: zstd
//! warehouse:
//!   database: ./nhl.duckdb
//!   drop_tables: false
//! ```

use crate::engine::ExtractorConfig;
use crate::error::{Error, Result};
use crate::output::ParquetWriterConfig;
use crate::warehouse::{LoadPolicy, DEFAULT_FULL_REPLACE_TABLES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Request delay for pipeline runs, whether or not a config file sets the section
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

const EXTRACT_SECTION: &str = "extract";
const REQUEST_DELAY_KEY: &str = "request_delay_ms";

// ============================================================================
// Top-Level Pipeline Config
// ============================================================================

/// Complete pipeline configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Extractor settings
    pub extract: ExtractorConfig,

    /// Run dependent streams
    pub include_dependent: bool,

    /// Streams to run (empty = all)
    pub streams: Vec<String>,

    /// Parquet staging settings
    pub output: OutputConfig,

    /// DuckDB load settings
    pub warehouse: WarehouseConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut extract = ExtractorConfig::default();
        extract.request_delay_ms = DEFAULT_REQUEST_DELAY_MS;
        Self {
            extract,
            include_dependent: true,
            streams: Vec::new(),
            output: OutputConfig::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            let mut doc: serde_yaml::Value = serde_yaml::from_str(yaml)?;
            apply_pipeline_defaults(&mut doc);
            serde_yaml::from_value(doc)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.extract.validate()?;
        self.output.parquet_config()?;
        if self.streams.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::invalid_value("streams", "stream names cannot be empty"));
        }
        Ok(())
    }
}

/// Fill in pipeline defaults that differ from the library's own
fn apply_pipeline_defaults(doc: &mut serde_yaml::Value) {
    let Some(root) = doc.as_mapping_mut() else {
        return;
    };

    let section = root
        .entry(EXTRACT_SECTION.into())
        .or_insert(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
    if section.is_null() {
        *section = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }
    if let Some(extract) = section.as_mapping_mut() {
        if !extract.contains_key(REQUEST_DELAY_KEY) {
            extract.insert(REQUEST_DELAY_KEY.into(), DEFAULT_REQUEST_DELAY_MS.into());
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// Parquet staging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving one file per stream
    pub directory: PathBuf,

    /// Compression codec name
    pub compression: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data"),
            compression: "snappy".to_string(),
        }
    }
}

impl OutputConfig {
    /// Writer settings for this section
    pub fn parquet_config(&self) -> Result<ParquetWriterConfig> {
        ParquetWriterConfig::new().with_compression_name(&self.compression)
    }
}

// ============================================================================
// Warehouse
// ============================================================================

/// DuckDB load settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Database file (`:memory:` for an in-memory database)
    pub database: PathBuf,

    /// Tables replaced on every load
    pub full_replace_tables: Vec<String>,

    /// Replace every table
    pub drop_tables: bool,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("./nhl.duckdb"),
            full_replace_tables: DEFAULT_FULL_REPLACE_TABLES
                .iter()
                .map(ToString::to_string)
                .collect(),
            drop_tables: false,
        }
    }
}

impl WarehouseConfig {
    /// Load policy for this section
    pub fn policy(&self) -> LoadPolicy {
        LoadPolicy::new()
            .with_full_replace(self.full_replace_tables.iter().cloned())
            .with_drop_tables(self.drop_tables)
    }
}
