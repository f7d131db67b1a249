//! Snapshot persistence for the combined and long tables

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

pub const DEFAULT_RAW_OUTPUT: &str = "raw_combined_data.csv";
pub const DEFAULT_CLEANED_OUTPUT: &str = "cleaned_combined_data.csv";

/// Where the two snapshots are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    /// Joined table before the reshape
    pub raw: PathBuf,
    /// Final long table
    pub cleaned: PathBuf,
}

impl SnapshotPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            raw: dir.join(DEFAULT_RAW_OUTPUT),
            cleaned: dir.join(DEFAULT_CLEANED_OUTPUT),
        }
    }
}

/// Write both snapshots, creating parent directories and overwriting any
/// existing files.
pub fn persist_snapshots(
    combined: &DataFrame,
    long: &DataFrame,
    paths: &SnapshotPaths,
) -> Result<SnapshotPaths> {
    for path in [&paths.raw, &paths.cleaned] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    save_dataset(&mut combined.clone(), &paths.raw)?;
    save_dataset(&mut long.clone(), &paths.cleaned)?;

    Ok(paths.clone())
}

/// Save dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    debug!(path = %path.display(), rows = df.height(), "snapshot written");
    Ok(())
}
