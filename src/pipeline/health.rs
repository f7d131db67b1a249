//! Cleaning of the WHO health indicator table

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::error::WrangleError;

pub const REGION_CODE: &str = "SpatialDim";
pub const YEAR: &str = "TimeDim";
pub const INDICATOR: &str = "IndicatorCode";
pub const VALUE: &str = "Value";

/// Maximum number of rejected raw values kept for reporting
const REJECTION_SAMPLE_SIZE: usize = 5;

/// Column names used by the health cleaner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthColumns {
    pub region: String,
    pub year: String,
    pub indicator: String,
    pub value: String,
}

impl Default for HealthColumns {
    fn default() -> Self {
        Self {
            region: REGION_CODE.to_string(),
            year: YEAR.to_string(),
            indicator: INDICATOR.to_string(),
            value: VALUE.to_string(),
        }
    }
}

impl HealthColumns {
    /// Columns kept after cleaning, in output order
    pub fn allow_list(&self) -> [&str; 4] {
        [
            self.region.as_str(),
            self.year.as_str(),
            self.indicator.as_str(),
            self.value.as_str(),
        ]
    }
}

/// Rows dropped because their value did not coerce to a number
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rejections {
    pub count: usize,
    /// First few raw values that failed, `<null>` for missing ones
    pub sample: Vec<String>,
}

/// Output of [`clean_health`]
#[derive(Debug, Clone)]
pub struct HealthCleaning {
    pub table: DataFrame,
    pub rejections: Rejections,
}

/// Coerce the value column to `Float64`, drop rows that fail (NaN included)
/// and project to the four-column allow-list.
///
/// Idempotent: on a cleaned table the cast is a no-op and nothing is rejected.
pub fn clean_health(raw: &DataFrame, columns: &HealthColumns) -> Result<HealthCleaning> {
    for name in columns.allow_list() {
        if raw.column(name).is_err() {
            return Err(WrangleError::missing_column(name, raw).into());
        }
    }

    let original = raw.column(&columns.value)?;
    let numeric = coerce_numeric(original)?;
    let keep = numeric.is_not_null();

    let rejections = collect_rejections(original, &keep)?;
    if rejections.count > 0 {
        debug!(
            count = rejections.count,
            sample = ?rejections.sample,
            "dropping health rows with non-numeric values"
        );
    }

    let mut df = raw.select(columns.allow_list())?;
    df.with_column(numeric)?;
    let table = df.filter(&keep)?;

    Ok(HealthCleaning { table, rejections })
}

/// Cast to `Float64`; cells that fail to parse and NaN both become null.
pub(crate) fn coerce_numeric(column: &Column) -> Result<Column> {
    let numeric = column.cast(&DataType::Float64)?;
    let values: Float64Chunked = numeric
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();
    Ok(values.with_name(column.name().clone()).into_column())
}

fn collect_rejections(original: &Column, keep: &BooleanChunked) -> Result<Rejections> {
    let text = original.cast(&DataType::String)?;
    let text = text.as_materialized_series().str()?;

    let mut rejections = Rejections::default();
    for (value, kept) in text.into_iter().zip(keep.into_iter()) {
        if kept == Some(true) {
            continue;
        }
        rejections.count += 1;
        if rejections.sample.len() < REJECTION_SAMPLE_SIZE {
            rejections
                .sample
                .push(value.unwrap_or("<null>").to_string());
        }
    }

    Ok(rejections)
}
