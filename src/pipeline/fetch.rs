//! Health indicator ingest from the GHO JSON API
//!
//! The API answers with a JSON object whose top-level array field (`value`)
//! holds one object per observation. Each object is flattened into one row.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::WrangleError;

/// Default GHO endpoint for the `MORT_100` indicator
pub const DEFAULT_HEALTH_URL: &str = "https://ghoapi.azureedge.net/api/MORT_100";

/// Top-level field holding the observation array
pub const DEFAULT_HEALTH_FIELD: &str = "value";

/// Fetch the health indicator JSON with a single blocking GET.
///
/// No retry and no backoff: a non-success status is returned as
/// [`WrangleError::FetchStatus`] and the caller decides what to skip.
pub fn fetch_health_json(url: &str, field: &str) -> Result<DataFrame> {
    let client = Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    fetch_health_json_with(&client, url, field)
}

/// [`fetch_health_json`] with a caller-supplied client.
pub fn fetch_health_json_with(client: &Client, url: &str, field: &str) -> Result<DataFrame> {
    debug!(url, "requesting health indicator data");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to send request to {}", url))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WrangleError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let body = response
        .text()
        .with_context(|| format!("Failed to read response body from {}", url))?;
    debug!(bytes = body.len(), "received health indicator body");

    parse_health_json(&body, field)
}

/// Read a previously downloaded GHO response from disk.
pub fn load_health_file(path: &Path, field: &str) -> Result<DataFrame> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
    parse_health_json(&body, field)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

/// Parse a GHO body and flatten the array under `field` into a DataFrame.
pub fn parse_health_json(body: &str, field: &str) -> Result<DataFrame> {
    let root: Value = serde_json::from_str(body).map_err(WrangleError::from)?;
    let records = root
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| WrangleError::MissingField {
            field: field.to_string(),
        })?;

    flatten_records(records)
}

/// Flatten JSON objects into rows, one column per (dotted) key.
///
/// Columns appear in first-seen order. Keys absent from a record, or holding
/// `null`, are null in that row; a key that is always `null` still gets a
/// (fully null) column. Non-object elements carry no fields and are skipped.
pub fn flatten_records(records: &[Value]) -> Result<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Option<Value>>> = Vec::new();
    let mut row = 0usize;

    for record in records {
        let Some(object) = record.as_object() else {
            debug!(row, "skipping non-object record");
            continue;
        };

        let mut flat = Vec::new();
        flatten_object(None, object, &mut flat);

        for (name, value) in flat {
            let index = *positions.entry(name.clone()).or_insert_with(|| {
                names.push(name);
                cells.push(Vec::new());
                cells.len() - 1
            });
            let column = &mut cells[index];
            column.resize(row, None);
            column.push((!value.is_null()).then_some(value));
        }
        row += 1;
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(cells.iter_mut())
        .map(|(name, values)| {
            values.resize(row, None);
            build_column(name, values)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

fn flatten_object(prefix: Option<&str>, object: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_object(Some(&name), inner, out),
            Value::Array(_) => out.push((name, Value::String(value.to_string()))),
            scalar => out.push((name, scalar.clone())),
        }
    }
}

/// Inferred dtype of a flattened JSON column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonKind {
    Int,
    Float,
    Bool,
    Text,
}

fn infer_kind(values: &[Option<Value>]) -> JsonKind {
    let present: Vec<&Value> = values.iter().flatten().collect();
    if present.is_empty() {
        JsonKind::Text
    } else if present.iter().all(|v| v.is_i64()) {
        JsonKind::Int
    } else if present.iter().all(|v| v.is_number()) {
        JsonKind::Float
    } else if present.iter().all(|v| v.is_boolean()) {
        JsonKind::Bool
    } else {
        JsonKind::Text
    }
}

fn build_column(name: &str, values: &[Option<Value>]) -> Column {
    match infer_kind(values) {
        JsonKind::Int => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_i64))
                .collect();
            Column::new(name.into(), data)
        }
        JsonKind::Float => {
            let data: Vec<Option<f64>> = values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_f64))
                .collect();
            Column::new(name.into(), data)
        }
        JsonKind::Bool => {
            let data: Vec<Option<bool>> = values
                .iter()
                .map(|v| v.as_ref().and_then(Value::as_bool))
                .collect();
            Column::new(name.into(), data)
        }
        JsonKind::Text => {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|v| {
                    v.as_ref().map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Column::new(name.into(), data)
        }
    }
}
