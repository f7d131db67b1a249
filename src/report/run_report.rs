//! JSON run report
//!
//! Documents one wrangling run: where the data came from, what the profiler
//! saw, which rows were rejected and how many rows each stage produced.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{MissingCount, Rejections};
use crate::report::RunSummary;

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub version: String,
    pub gdp_file: String,
    /// URL or file the health data was read from
    pub health_source: String,
    pub raw_output: String,
    pub cleaned_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_window: Option<(i32, i32)>,
}

/// Missing value profiles of both raw tables
#[derive(Debug, Clone, Serialize)]
pub struct Profiles {
    pub economic: Vec<MissingCount>,
    pub health: Vec<MissingCount>,
}

/// Rows produced by each stage
#[derive(Debug, Clone, Serialize)]
pub struct RowCounts {
    pub economic_raw: usize,
    pub economic_skipped: usize,
    pub economic_cleaned: usize,
    pub health_raw: usize,
    pub health_cleaned: usize,
    pub combined: usize,
    pub reshaped_years: usize,
    pub long: usize,
    pub duplicate_keys: usize,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: String,
    pub ms: u64,
}

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: ReportMetadata,
    pub profiles: Profiles,
    pub rejections: Rejections,
    pub rows: RowCounts,
    pub timing: Vec<StageTiming>,
    pub total_ms: u64,
}

impl RunReport {
    pub fn new(metadata: ReportMetadata, profiles: Profiles, summary: &RunSummary) -> Self {
        Self {
            metadata,
            profiles,
            rejections: summary.rejections.clone(),
            rows: RowCounts {
                economic_raw: summary.economic_raw_rows,
                economic_skipped: summary.economic_skipped_rows,
                economic_cleaned: summary.economic_rows,
                health_raw: summary.health_raw_rows,
                health_cleaned: summary.health_rows,
                combined: summary.combined_rows,
                reshaped_years: summary.reshaped_years,
                long: summary.long_rows,
                duplicate_keys: summary.duplicate_keys,
            },
            timing: summary
                .timings
                .iter()
                .map(|(stage, elapsed)| StageTiming {
                    stage: stage.clone(),
                    ms: elapsed.as_millis() as u64,
                })
                .collect(),
            total_ms: summary.total_time().as_millis() as u64,
        }
    }
}

/// Metadata stamped with the current time and crate version
pub fn report_metadata(
    gdp_file: &Path,
    health_source: &str,
    raw_output: &Path,
    cleaned_output: &Path,
    year_window: Option<(i32, i32)>,
) -> ReportMetadata {
    ReportMetadata {
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        gdp_file: gdp_file.display().to_string(),
        health_source: health_source.to_string(),
        raw_output: raw_output.display().to_string(),
        cleaned_output: cleaned_output.display().to_string(),
        year_window,
    }
}

/// Write the report as pretty-printed JSON
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}
