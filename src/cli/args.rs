//! Command-line argument definitions using clap

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::pipeline::{
    CombineOptions, HealthColumns, SnapshotPaths, DEFAULT_CLEANED_OUTPUT, DEFAULT_FROM_YEAR,
    DEFAULT_HEALTH_FIELD, DEFAULT_HEALTH_URL, DEFAULT_RAW_OUTPUT, DEFAULT_SENTINEL_YEAR,
    DEFAULT_TO_YEAR,
};

/// World Bank GDP extract downloaded next to the tool
pub const DEFAULT_GDP_FILE: &str = "API_NY.GDP.MKTP.CD_DS2_en_csv_v2_2.csv";

/// Income-Health - combine World Bank GDP and WHO mortality data into one tidy table
#[derive(Parser, Debug)]
#[command(name = "income-health")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// World Bank GDP CSV (metadata lines above the header are allowed)
    #[arg(long, default_value = DEFAULT_GDP_FILE)]
    pub gdp_file: PathBuf,

    /// GHO API endpoint returning the mortality indicator
    #[arg(long, default_value = DEFAULT_HEALTH_URL)]
    pub health_url: String,

    /// Read the GHO response from a local JSON file instead of the URL
    #[arg(long)]
    pub health_file: Option<PathBuf>,

    /// Top-level JSON field holding the observation array
    #[arg(long, default_value = DEFAULT_HEALTH_FIELD)]
    pub health_field: String,

    /// Directory the snapshots and charts are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name of the joined, pre-reshape snapshot (CSV or Parquet by extension)
    #[arg(long, default_value = DEFAULT_RAW_OUTPUT)]
    pub raw_output: String,

    /// File name of the tidy long snapshot (CSV or Parquet by extension)
    #[arg(long, default_value = DEFAULT_CLEANED_OUTPUT)]
    pub cleaned_output: String,

    /// First year reshaped into the long table
    #[arg(long, default_value_t = DEFAULT_FROM_YEAR)]
    pub from_year: i32,

    /// Last year reshaped into the long table (inclusive)
    #[arg(long, default_value_t = DEFAULT_TO_YEAR)]
    pub to_year: i32,

    /// Reshape every year column, ignoring --from-year/--to-year
    #[arg(long, default_value = "false")]
    pub all_years: bool,

    /// Degenerate year column dropped before the join
    #[arg(long, default_value = DEFAULT_SENTINEL_YEAR)]
    pub sentinel_year: String,

    /// Drop long rows without a GDP value
    #[arg(long, default_value = "false")]
    pub drop_missing_gdp: bool,

    /// Skip chart rendering
    #[arg(long, default_value = "false")]
    pub no_charts: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Reject option combinations clap cannot check on its own.
    pub fn validate(&self) -> Result<(), String> {
        if !self.all_years && self.from_year > self.to_year {
            return Err(format!(
                "--from-year ({}) must not be later than --to-year ({})",
                self.from_year, self.to_year
            ));
        }
        Ok(())
    }

    /// Year window shown in the configuration card and report
    pub fn year_window(&self) -> Option<(i32, i32)> {
        (!self.all_years).then_some((self.from_year, self.to_year))
    }

    pub fn combine_options(&self) -> CombineOptions {
        let sentinel = self.sentinel_year.trim();
        CombineOptions {
            health: HealthColumns::default(),
            sentinel_column: (!sentinel.is_empty()).then(|| sentinel.to_string()),
            years: self.year_window().map(|(from, to)| from..=to),
            drop_missing_gdp: self.drop_missing_gdp,
        }
    }

    pub fn snapshot_paths(&self) -> SnapshotPaths {
        SnapshotPaths {
            raw: self.output_dir.join(&self.raw_output),
            cleaned: self.output_dir.join(&self.cleaned_output),
        }
    }

    /// Human-readable health data source
    pub fn health_source(&self) -> String {
        match &self.health_file {
            Some(path) => path.display().to_string(),
            None => self.health_url.clone(),
        }
    }

    pub fn chart_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(file_name)
    }
}
