//! Error types for the wrangling pipeline.
//!
//! Stages return `anyhow::Result`; the variants here are the failures a caller
//! may want to match on (for example to report a failed download differently
//! from a malformed file).

use thiserror::Error;

/// Domain failures raised by the ingest, cleaning and combine stages.
#[derive(Debug, Error)]
pub enum WrangleError {
    /// The health endpoint answered with a non-success status.
    #[error("Failed to fetch data from {url}. Status code: {status}")]
    FetchStatus {
        /// Requested URL
        url: String,
        /// HTTP status code returned by the server
        status: u16,
    },

    /// The JSON body has no array under the expected top-level field.
    #[error("JSON body has no array field '{field}'")]
    MissingField { field: String },

    /// No row of the raw delimited file looks like the column header.
    #[error("No header row containing '{label}' found in {rows} row(s)")]
    HeaderNotFound { label: String, rows: usize },

    /// A column required by a cleaning or combine step is absent.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// The body could not be parsed as JSON.
    #[error("Error parsing JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

impl WrangleError {
    pub(crate) fn missing_column(column: &str, df: &polars::prelude::DataFrame) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            available: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
