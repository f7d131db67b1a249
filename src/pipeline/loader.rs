//! Dataset loader for raw delimited files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::debug;

/// A delimited file read as a positional grid, before any header is known.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// One nullable `String` column per field position (`column_1`, `column_2`, ...)
    pub table: DataFrame,
    /// Records the csv reader could not decode (e.g. invalid UTF-8)
    pub skipped_rows: usize,
}

/// Load a delimited file without promoting any row to a header.
///
/// Every record becomes one row, metadata lines included, so the cleaner can
/// decide where the real header sits. Empty cells are null and short rows are
/// padded with nulls. Records that fail to decode are skipped, never fatal.
pub fn load_delimited(path: &Path) -> Result<RawTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open delimited file: {}", path.display()))?;
    read_delimited(file).with_context(|| format!("Failed to load CSV file: {}", path.display()))
}

/// Same as [`load_delimited`] over any reader.
pub fn read_delimited<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut skipped_rows = 0usize;

    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let mut cells: Vec<Option<String>> = record.iter().map(to_cell).collect();
                if rows.is_empty() {
                    if let Some(Some(first)) = cells.first_mut() {
                        *first = first.trim_start_matches('\u{feff}').to_string();
                    }
                }
                rows.push(cells);
            }
            Err(err) if err.is_io_error() => {
                return Err(err).context("I/O error while reading records");
            }
            Err(err) => {
                debug!(record = index, error = %err, "skipping malformed record");
                skipped_rows += 1;
            }
        }
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let columns: Vec<Column> = (0..width)
        .map(|i| {
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|row| row.get(i).cloned().flatten())
                .collect();
            Column::new(format!("column_{}", i + 1).into(), values)
        })
        .collect();

    let table = DataFrame::new(columns)?;
    debug!(
        rows = table.height(),
        columns = table.width(),
        skipped_rows,
        "loaded delimited grid"
    );

    Ok(RawTable {
        table,
        skipped_rows,
    })
}

/// Row count, column count and estimated memory (MB) of a frame
pub fn dataset_stats(df: &DataFrame) -> (usize, usize, f64) {
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    (rows, cols, memory_mb)
}

fn to_cell(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}
