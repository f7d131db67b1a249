//! Missing value profiling
//!
//! Purely diagnostic: the profile is printed (and optionally exported) so the
//! cleaning decisions can be checked, but no cleaner consumes it.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

/// Null count of a single column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
    pub ratio: f64,
}

/// Count missing values per column.
///
/// Only columns with at least one null are returned, sorted by count
/// descending (ties keep column order).
pub fn analyze_missing_values(df: &DataFrame) -> Result<Vec<MissingCount>> {
    let height = df.height();
    if height == 0 {
        return Ok(Vec::new());
    }

    let mut counts: Vec<MissingCount> = df
        .get_columns()
        .iter()
        .filter_map(|column| {
            let count = column.null_count();
            (count > 0).then(|| MissingCount {
                column: column.name().to_string(),
                count,
                ratio: count as f64 / height as f64,
            })
        })
        .collect();

    // Stable sort keeps column order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    Ok(counts)
}

/// Columns that are null in every row
pub fn fully_missing_columns(profile: &[MissingCount], height: usize) -> Vec<String> {
    if height == 0 {
        return Vec::new();
    }
    profile
        .iter()
        .filter(|m| m.count == height)
        .map(|m| m.column.clone())
        .collect()
}
