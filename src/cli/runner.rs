//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ExtractArgs, LoadArgs};
use crate::config::PipelineConfig;
use crate::engine::{Extractor, ResultSet};
use crate::error::{Error, Result};
use crate::output::{write_result_set, WrittenFile};
use crate::types::OptionStringExt;
use crate::warehouse::{LoadReport, WarehouseLoader};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Extract(args) => {
                let config = self.extract_config(args)?;
                let written = self.extract(&config).await?;
                print_written(&written);
                Ok(())
            }
            Commands::Load(args) => {
                let config = self.load_config(args)?;
                let reports = self.load(&config, &config.output.directory)?;
                print_reports(&reports);
                Ok(())
            }
            Commands::Run {
                extract,
                database,
                drop_tables,
            } => {
                let mut config = self.extract_config(extract)?;
                if let Some(database) = database {
                    config.warehouse.database.clone_from(database);
                }
                config.warehouse.drop_tables |= *drop_tables;

                let written = self.extract(&config).await?;
                print_written(&written);
                let reports = self.load(&config, &config.output.directory)?;
                print_reports(&reports);
                Ok(())
            }
            Commands::Streams => self.streams(),
        }
    }

    /// Configuration file contents, or defaults without one
    fn base_config(&self) -> Result<PipelineConfig> {
        match &self.cli.config {
            Some(path) => PipelineConfig::from_file(path),
            None => Ok(PipelineConfig::default()),
        }
    }

    /// Configuration with extraction flags applied
    pub fn extract_config(&self, args: &ExtractArgs) -> Result<PipelineConfig> {
        let mut config = self.base_config()?;
        let extract = &mut config.extract;

        if let Some(start) = args.start_date.clone().none_if_empty() {
            extract.start_date = Some(start);
        }
        if let Some(end) = args.end_date.clone().none_if_empty() {
            extract.end_date = Some(end);
        }
        if let Some(delay) = args.request_delay {
            extract.request_delay_ms = seconds("request_delay", delay)?.as_millis() as u64;
        }
        if let Some(delay) = args.retry_delay {
            extract.retry_delay_ms = seconds("retry_delay", delay)?.as_millis() as u64;
        }
        if let Some(retries) = args.max_retries {
            extract.max_retries = retries;
        }
        if let Some(url) = &args.base_url {
            extract.base_url.clone_from(url);
        }
        if let Some(dir) = &args.output_dir {
            config.output.directory.clone_from(dir);
        }
        if args.no_dependent {
            config.include_dependent = false;
        }
        if !args.streams.is_empty() {
            config.streams = args
                .streams
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Configuration with load flags applied
    pub fn load_config(&self, args: &LoadArgs) -> Result<PipelineConfig> {
        let mut config = self.base_config()?;
        if let Some(dir) = &args.input_dir {
            config.output.directory.clone_from(dir);
        }
        if let Some(database) = &args.database {
            config.warehouse.database.clone_from(database);
        }
        config.warehouse.drop_tables |= args.drop_tables;
        Ok(config)
    }

    /// Extract configured streams and stage them as Parquet
    pub async fn extract(&self, config: &PipelineConfig) -> Result<Vec<WrittenFile>> {
        let extract = &config.extract;
        info!("NHL Data Extraction to Parquet Files");
        info!(
            "Date range: {} to {}",
            extract.start_date.as_deref().unwrap_or("7 days ago"),
            extract.end_date.as_deref().unwrap_or("today")
        );
        info!("Output directory: {}", config.output.directory.display());
        info!("Request delay: {}ms", extract.request_delay_ms);

        let extractor = Extractor::new(extract)?;
        let results = self.extract_results(&extractor, config).await?;

        info!("Saving to Parquet files...");
        let writer_config = config.output.parquet_config()?;
        write_result_set(&results, &config.output.directory, &writer_config)
    }

    async fn extract_results(
        &self,
        extractor: &Extractor,
        config: &PipelineConfig,
    ) -> Result<ResultSet> {
        if config.streams.is_empty() {
            return extractor.extract_all(config.include_dependent).await;
        }

        let mut names = Vec::with_capacity(config.streams.len());
        for name in &config.streams {
            let stream = extractor.stream(name)?;
            if config.include_dependent || stream.parent().is_none() {
                names.push(name.as_str());
            }
        }
        extractor.extract_selected(names.as_slice()).await
    }

    /// Load every staged file in `dir`
    pub fn load(&self, config: &PipelineConfig, dir: &Path) -> Result<Vec<LoadReport>> {
        let policy = config.warehouse.policy();
        info!(
            "Full replace tables: {}",
            policy.full_replace_tables().collect::<Vec<_>>().join(", ")
        );
        info!("Drop tables: {}", policy.drops_tables());

        let loader = WarehouseLoader::open(&config.warehouse.database, policy)?;
        loader.load_directory(dir)
    }

    /// List registered streams
    fn streams(&self) -> Result<()> {
        let config = self.base_config()?;
        let extractor = Extractor::new(&config.extract)?;

        println!("{:<20} {:<12} {:<40} PARENT", "NAME", "KIND", "ENDPOINT");
        for stream in extractor.streams() {
            println!(
                "{:<20} {:<12} {:<40} {}",
                stream.name(),
                stream.kind().as_str(),
                stream.descriptor().endpoint(),
                stream.parent().map_or("-", |p| p.name())
            );
        }
        Ok(())
    }
}

/// Convert a seconds flag to a duration
fn seconds(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| Error::invalid_value(field, format!("{value}: {e}")))
}

fn print_written(written: &[WrittenFile]) {
    for file in written {
        println!("{:<20} {:>8} rows  {}", file.stream, file.rows, file.path.display());
    }
    println!(
        "Extraction complete: {} files, {} rows",
        written.len(),
        written.iter().map(|f| f.rows).sum::<usize>()
    );
}

fn print_reports(reports: &[LoadReport]) {
    for report in reports {
        println!(
            "{:<20} {:<18} {:>8} loaded {:>8} total",
            report.table,
            report.mode.to_string(),
            report.rows_loaded,
            report.total_rows
        );
    }
    println!("Loaded {} tables", reports.len());
}
