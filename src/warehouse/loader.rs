//! DuckDB warehouse loader
//!
//! Loads staged Parquet files into DuckDB tables named after the file stem.

use crate::engine::catalog::{CURRENT_STANDINGS, CURRENT_TEAMS, SEASON_SCHEDULES, TEAM_ROSTERS};
use crate::error::{Error, Result, ResultExt};
use crate::output::PARQUET_EXTENSION;
use crate::types::LoadMode;
use duckdb::Connection;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// In-memory database location
pub const IN_MEMORY: &str = ":memory:";

/// Tables rebuilt from scratch on every load
pub const DEFAULT_FULL_REPLACE_TABLES: [&str; 4] =
    [TEAM_ROSTERS, CURRENT_STANDINGS, CURRENT_TEAMS, SEASON_SCHEDULES];

/// Decides the load mode per table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPolicy {
    full_replace: BTreeSet<String>,
    drop_tables: bool,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            full_replace: DEFAULT_FULL_REPLACE_TABLES
                .iter()
                .map(ToString::to_string)
                .collect(),
            drop_tables: false,
        }
    }
}

impl LoadPolicy {
    /// Create a policy with the default full-replace tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tables that are always fully replaced
    #[must_use]
    pub fn with_full_replace<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.full_replace = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Force full replace for every table
    #[must_use]
    pub fn with_drop_tables(mut self, drop_tables: bool) -> Self {
        self.drop_tables = drop_tables;
        self
    }

    /// Tables that are always fully replaced
    pub fn full_replace_tables(&self) -> impl Iterator<Item = &str> {
        self.full_replace.iter().map(String::as_str)
    }

    /// Whether every table is fully replaced
    pub fn drops_tables(&self) -> bool {
        self.drop_tables
    }

    /// Load mode for `table`
    pub fn mode_for(&self, table: &str) -> LoadMode {
        if self.drop_tables || self.full_replace.contains(table) {
            LoadMode::Replace
        } else {
            LoadMode::Append
        }
    }
}

/// Outcome of loading one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Target table
    pub table: String,
    /// Mode the file was loaded with
    pub mode: LoadMode,
    /// Rows read from the file
    pub rows_loaded: u64,
    /// Rows in the table after the load
    pub total_rows: u64,
}

/// Loader writing Parquet files into a DuckDB database
pub struct WarehouseLoader {
    /// DuckDB connection
    conn: Connection,
    /// Load policy
    policy: LoadPolicy,
    /// Database path (for logging)
    location: String,
}

impl std::fmt::Debug for WarehouseLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseLoader")
            .field("location", &self.location)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl WarehouseLoader {
    /// Open (or create) a database file; `:memory:` opens an in-memory database
    pub fn open(path: impl AsRef<Path>, policy: LoadPolicy) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == IN_MEMORY {
            return Self::in_memory(policy);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).map_err(|e| {
            Error::config(format!("Failed to open DuckDB at {}: {e}", path.display()))
        })?;

        Ok(Self {
            conn,
            policy,
            location: path.display().to_string(),
        })
    }

    /// Open an in-memory database
    pub fn in_memory(policy: LoadPolicy) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self {
            conn,
            policy,
            location: IN_MEMORY.to_string(),
        })
    }

    /// Load policy
    pub fn policy(&self) -> &LoadPolicy {
        &self.policy
    }

    /// Database location
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Load every Parquet file in `dir`, in file name order
    pub fn load_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<LoadReport>> {
        let dir = dir.as_ref();
        let files = parquet_files(dir)?;

        info!("Loading Parquet files from {} into {}", dir.display(), self.location);
        info!("Found {} Parquet files", files.len());
        if files.is_empty() {
            warn!("Nothing to load in {}", dir.display());
        }

        files.iter().map(|path| self.load_file(path)).collect()
    }

    /// Load one Parquet file into the table named after its stem
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        let table = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::output(format!("Invalid file name: {}", path.display())))?;
        validate_table_name(table)?;

        let mode = self.policy.mode_for(table);
        info!("Loading {table} (mode: {mode})");

        let source = format!("read_parquet({})", sql_string(&path.to_string_lossy()));
        let rows_loaded = self.count(table, &format!("SELECT COUNT(*) FROM {source}"))?;

        let sql = match mode {
            LoadMode::Replace => {
                format!("CREATE OR REPLACE TABLE {table} AS SELECT * FROM {source}")
            }
            LoadMode::Append if self.table_exists(table)? => {
                debug!("Table {table} exists, appending");
                format!("INSERT INTO {table} BY NAME SELECT * FROM {source}")
            }
            LoadMode::Append => {
                info!("Table {table} doesn't exist, creating it");
                format!("CREATE TABLE {table} AS SELECT * FROM {source}")
            }
        };
        self.conn
            .execute_batch(&sql)
            .map_err(|e| Error::load(table, e.to_string()))?;

        let total_rows = self.row_count(table)?;
        info!("Table {table} now has {total_rows} total records");

        Ok(LoadReport {
            table: table.to_string(),
            mode,
            rows_loaded,
            total_rows,
        })
    }

    /// Whether `table` exists in the main schema
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'main' AND table_name = ?",
            duckdb::params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Rows currently in `table`
    pub fn row_count(&self, table: &str) -> Result<u64> {
        validate_table_name(table)?;
        self.count(table, &format!("SELECT COUNT(*) FROM {table}"))
    }

    /// Run a read-only query and return its rows as strings
    ///
    /// Used for inspecting loaded tables.
    pub fn query_strings(&self, sql: &str) -> Result<Vec<Vec<Option<String>>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let width = row.as_ref().column_count();
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value: duckdb::types::Value = row.get(idx)?;
                values.push(value_to_string(value));
            }
            out.push(values);
        }
        Ok(out)
    }

    fn count(&self, table: &str, sql: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(sql, [], |row| row.get(0))
            .map_err(|e| Error::load(table, e.to_string()))?;
        Ok(count as u64)
    }
}

/// Parquet files directly inside `dir`, sorted by file name
pub fn parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| Error::config(format!("Cannot read input directory {}: {e}", dir.display())))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(PARQUET_EXTENSION))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Reject anything that is not a plain SQL identifier
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::load(name, "table name is not a valid identifier"))
    }
}

fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn value_to_string(value: duckdb::types::Value) -> Option<String> {
    use duckdb::types::Value;
    match value {
        Value::Null => None,
        Value::Boolean(b) => Some(b.to_string()),
        Value::TinyInt(n) => Some(n.to_string()),
        Value::SmallInt(n) => Some(n.to_string()),
        Value::Int(n) => Some(n.to_string()),
        Value::BigInt(n) => Some(n.to_string()),
        Value::HugeInt(n) => Some(n.to_string()),
        Value::UTinyInt(n) => Some(n.to_string()),
        Value::USmallInt(n) => Some(n.to_string()),
        Value::UInt(n) => Some(n.to_string()),
        Value::UBigInt(n) => Some(n.to_string()),
        Value::Float(n) => Some(n.to_string()),
        Value::Double(n) => Some(n.to_string()),
        Value::Text(s) => Some(s),
        other => Some(format!("{other:?}")),
    }
}
