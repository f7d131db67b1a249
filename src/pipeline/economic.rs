//! Cleaning of the World Bank GDP table
//!
//! The raw file carries a few metadata lines above the real header. The
//! cleaner finds the header by its content, promotes it, coerces the year
//! columns to numbers and projects down to the key and year columns.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

use super::error::WrangleError;
use super::health::coerce_numeric;

pub const COUNTRY_NAME: &str = "Country Name";
pub const COUNTRY_CODE: &str = "Country Code";
pub const INDICATOR_NAME: &str = "Indicator Name";
pub const INDICATOR_CODE: &str = "Indicator Code";

/// Identity columns kept ahead of the year columns, in output order
pub const KEY_COLUMNS: [&str; 4] = [COUNTRY_NAME, COUNTRY_CODE, INDICATOR_NAME, INDICATOR_CODE];

/// Clean the raw economic grid into one row per country.
///
/// Idempotent: a frame that already carries a `Country Code` column skips
/// header location, and every later step is a no-op on clean input.
pub fn clean_economic(raw: &DataFrame) -> Result<DataFrame> {
    let mut df = if has_column(raw, COUNTRY_CODE) {
        raw.clone()
    } else {
        promote_header(raw)?
    };

    for name in year_columns(&df) {
        let numeric = coerce_numeric(df.column(&name)?)?;
        df.with_column(numeric)?;
    }

    let df = drop_empty_rows(&df)?;
    let code_present = df.column(COUNTRY_CODE)?.is_not_null();
    let df = df.filter(&code_present)?;
    let df = drop_empty_columns(&df);

    let keep: Vec<String> = KEY_COLUMNS
        .iter()
        .filter(|name| has_column(&df, name))
        .map(|name| name.to_string())
        .chain(year_columns(&df))
        .collect();

    debug!(
        rows = df.height(),
        columns = keep.len(),
        "economic table cleaned"
    );

    Ok(df.select(keep)?)
}

/// Index of the first row holding `label` in any cell.
pub fn locate_header(raw: &DataFrame, label: &str) -> Result<usize> {
    let text = text_columns(raw)?;
    (0..raw.height())
        .find(|&row| {
            text.iter()
                .any(|ca| ca.get(row).map(str::trim) == Some(label))
        })
        .ok_or_else(|| {
            WrangleError::HeaderNotFound {
                label: label.to_string(),
                rows: raw.height(),
            }
            .into()
        })
}

/// Parse a year column label such as `2020` or `2020.0`.
pub fn parse_year_label(label: &str) -> Option<i32> {
    let label = label.trim();
    let digits = label.strip_suffix(".0").unwrap_or(label);
    if digits.len() == 4 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Names of the year-labelled columns, in frame order
pub fn year_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .filter(|name| parse_year_label(name).is_some())
        .map(|name| name.to_string())
        .collect()
}

/// Drop rows where every cell is null.
pub fn drop_empty_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("non_empty".into(), false, df.height());
    for column in df.get_columns() {
        mask = &mask | &column.is_not_null();
    }
    Ok(df.filter(&mask)?)
}

/// Drop columns where every cell is null. A frame without rows is returned as is.
pub fn drop_empty_columns(df: &DataFrame) -> DataFrame {
    let height = df.height();
    if height == 0 {
        return df.clone();
    }
    let empty: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.null_count() == height)
        .map(|column| column.name().to_string())
        .collect();
    if !empty.is_empty() {
        debug!(columns = ?empty, "dropping fully empty columns");
    }
    df.drop_many(empty.iter().map(String::as_str))
}

fn promote_header(raw: &DataFrame) -> Result<DataFrame> {
    let header_row = locate_header(raw, COUNTRY_CODE)?;
    let text = text_columns(raw)?;
    let cells: Vec<Option<&str>> = text.iter().map(|ca| ca.get(header_row)).collect();
    let names = header_names(&cells);

    let start = header_row + 1;
    let mut body = raw.slice(start as i64, raw.height().saturating_sub(start));
    body.set_column_names(names)?;

    debug!(header_row, rows = body.height(), "promoted header row");
    Ok(body)
}

/// Column names from header cells: blanks become `column_N`, duplicates get
/// a numeric suffix and `1960.0` style labels lose the fraction.
fn header_names(cells: &[Option<&str>]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell.map(str::trim) {
                Some(label) if !label.is_empty() => match parse_year_label(label) {
                    Some(year) => year.to_string(),
                    None => label.to_string(),
                },
                _ => format!("column_{}", i + 1),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}_{}", base, *count - 1)
            }
        })
        .collect()
}

fn text_columns(df: &DataFrame) -> Result<Vec<StringChunked>> {
    df.get_columns()
        .iter()
        .map(|column| {
            let text = column.cast(&DataType::String)?;
            Ok(text.as_materialized_series().str()?.clone())
        })
        .collect()
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
