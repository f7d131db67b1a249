//! Join the cleaned tables and reshape them into the tidy long table

use std::collections::HashSet;
use std::ops::RangeInclusive;

use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use super::economic::{parse_year_label, year_columns, COUNTRY_CODE, COUNTRY_NAME, INDICATOR_CODE};
use super::error::WrangleError;
use super::health::HealthColumns;

pub const COUNTRY: &str = "Country";
pub const MORTALITY_RATE: &str = "Mortality Rate";
pub const YEAR_LABEL: &str = "Year";
pub const DATE: &str = "Date";
pub const GDP: &str = "GDP";

const ROW_INDEX: &str = "__row";

/// Year column with no usable values in the World Bank extract
pub const DEFAULT_SENTINEL_YEAR: &str = "1960";
pub const DEFAULT_FROM_YEAR: i32 = 2014;
pub const DEFAULT_TO_YEAR: i32 = 2023;

/// Columns of the long table, in output order
pub const LONG_COLUMNS: [&str; 5] = [COUNTRY_NAME, COUNTRY_CODE, DATE, GDP, MORTALITY_RATE];

/// Options for the join and reshape steps
#[derive(Debug, Clone, PartialEq)]
pub struct CombineOptions {
    pub health: HealthColumns,
    /// Year column dropped before the join, if present
    pub sentinel_column: Option<String>,
    /// Year window to reshape; `None` reshapes every year column
    pub years: Option<RangeInclusive<i32>>,
    /// Drop long rows whose GDP is null
    pub drop_missing_gdp: bool,
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            health: HealthColumns::default(),
            sentinel_column: Some(DEFAULT_SENTINEL_YEAR.to_string()),
            years: Some(DEFAULT_FROM_YEAR..=DEFAULT_TO_YEAR),
            drop_missing_gdp: false,
        }
    }
}

/// Both tables produced by [`combine`]
#[derive(Debug, Clone)]
pub struct Combined {
    /// Joined, pre-reshape table (persisted as the raw snapshot)
    pub combined: DataFrame,
    /// Tidy long table (persisted as the cleaned snapshot)
    pub long: DataFrame,
}

/// Join and reshape in one go.
pub fn combine(health: &DataFrame, economic: &DataFrame, options: &CombineOptions) -> Result<Combined> {
    let combined = join_tables(health, economic, options)?;
    let long = reshape_long(&combined, options)?;
    Ok(Combined { combined, long })
}

/// Keep one health row per region: the latest year, first row on ties.
///
/// Surviving rows keep their original order.
pub fn latest_per_region(health: &DataFrame, columns: &HealthColumns) -> Result<DataFrame> {
    require(health, &columns.region)?;
    require(health, &columns.year)?;

    let latest = health
        .clone()
        .lazy()
        .with_row_index(ROW_INDEX, None)
        .sort_by_exprs(
            [col(columns.year.as_str())],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .unique_stable(
            Some(vec![columns.region.as_str().into()]),
            UniqueKeepStrategy::First,
        )
        .sort([ROW_INDEX], SortMultipleOptions::default())
        .collect()?
        .drop(ROW_INDEX)?;

    let superseded = health.height() - latest.height();
    if superseded > 0 {
        debug!(superseded, "keeping the latest observation per region");
    }

    Ok(latest)
}

/// Inner-join cleaned health and economic tables on region = country code.
///
/// The sentinel year column is dropped first, `SpatialDim` becomes `Country`
/// and `Value` becomes `Mortality Rate`. Rows are sorted by country code.
pub fn join_tables(
    health: &DataFrame,
    economic: &DataFrame,
    options: &CombineOptions,
) -> Result<DataFrame> {
    let columns = &options.health;
    require(health, &columns.value)?;
    require(economic, COUNTRY_CODE)?;

    let economic = match options.sentinel_column.as_deref() {
        Some(sentinel) if has_column(economic, sentinel) => economic.drop(sentinel)?,
        _ => economic.clone(),
    };

    let mut health = latest_per_region(health, columns)?;
    let region_key = health.column(&columns.region)?.cast(&DataType::String)?;
    health.with_column(region_key)?;

    let mut economic = economic;
    let code_key = economic.column(COUNTRY_CODE)?.cast(&DataType::String)?;
    economic.with_column(code_key)?;

    let mut joined = health
        .clone()
        .lazy()
        .join(
            economic.clone().lazy(),
            [col(columns.region.as_str())],
            [col(COUNTRY_CODE)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    debug!(
        health_regions = health.height(),
        economic_rows = economic.height(),
        joined_rows = joined.height(),
        "inner join complete"
    );

    // Inner joins may coalesce the right key away
    if !has_column(&joined, COUNTRY_CODE) {
        let code = joined
            .column(&columns.region)?
            .clone()
            .with_name(COUNTRY_CODE.into());
        joined.with_column(code)?;
    }
    joined.rename(&columns.region, COUNTRY.into())?;
    joined.rename(&columns.value, MORTALITY_RATE.into())?;

    let renamed = |name: &str| -> String {
        if name == columns.region {
            COUNTRY.to_string()
        } else if name == columns.value {
            MORTALITY_RATE.to_string()
        } else {
            name.to_string()
        }
    };

    let mut order: Vec<String> = Vec::new();
    for name in health
        .get_column_names()
        .iter()
        .map(|n| renamed(n.as_str()))
        .chain(economic.get_column_names().iter().map(|n| n.to_string()))
    {
        if has_column(&joined, &name) && !order.contains(&name) {
            order.push(name);
        }
    }

    let joined = joined
        .select(order)?
        .sort([COUNTRY_CODE], SortMultipleOptions::default().with_maintain_order(true))?;

    Ok(joined)
}

/// Year columns of `combined` that the reshape turns into rows, by year ascending
pub fn reshaped_year_columns(combined: &DataFrame, options: &CombineOptions) -> Vec<String> {
    let mut years: Vec<(i32, String)> = year_columns(combined)
        .into_iter()
        .filter(|label| options.sentinel_column.as_deref() != Some(label.as_str()))
        .filter_map(|label| parse_year_label(&label).map(|year| (year, label)))
        .filter(|(year, _)| {
            options
                .years
                .as_ref()
                .map_or(true, |window| window.contains(year))
        })
        .collect();
    years.sort_by_key(|(year, _)| *year);
    years.into_iter().map(|(_, label)| label).collect()
}

/// Unpivot the year columns of the combined table into (Date, GDP) rows.
///
/// Output is year-major: every combined row for the first year, then the
/// next year, so repeated runs produce identical tables.
pub fn reshape_long(combined: &DataFrame, options: &CombineOptions) -> Result<DataFrame> {
    let ids: Vec<&str> = [COUNTRY, COUNTRY_CODE, INDICATOR_CODE, MORTALITY_RATE, COUNTRY_NAME]
        .into_iter()
        .filter(|name| has_column(combined, name))
        .collect();
    let years = reshaped_year_columns(combined, options);

    let mut wide = combined.select(ids.iter().copied().chain(years.iter().map(String::as_str)))?;
    for label in &years {
        let gdp = wide.column(label)?.cast(&DataType::Float64)?;
        wide.with_column(gdp)?;
    }

    let mut long = if years.is_empty() {
        // An empty `on` list would unpivot every non-id column
        let mut empty = wide.clear();
        empty.with_column(Column::new_empty(YEAR_LABEL.into(), &DataType::String))?;
        empty.with_column(Column::new_empty(GDP.into(), &DataType::Float64))?;
        empty
    } else {
        let mut long = wide.unpivot(years.iter().map(String::as_str), ids.iter().copied())?;
        long.rename("variable", YEAR_LABEL.into())?;
        long.rename("value", GDP.into())?;
        long
    };

    let labels = long.column(YEAR_LABEL)?.cast(&DataType::String)?;
    let days: Vec<Option<i32>> = labels
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|label| label.and_then(parse_year_label).and_then(first_day_of_year))
        .collect();
    let date = Column::new(DATE.into(), days).cast(&DataType::Date)?;
    long.with_column(date)?;

    let mut long = long.drop_many([YEAR_LABEL, COUNTRY, INDICATOR_CODE]);

    if options.drop_missing_gdp {
        let present = long.column(GDP)?.is_not_null();
        long = long.filter(&present)?;
    }

    let order: Vec<&str> = LONG_COLUMNS
        .into_iter()
        .filter(|name| has_column(&long, name))
        .collect();

    Ok(long.select(order)?)
}

/// Number of rows repeating an earlier (country code, date) key
pub fn duplicate_keys(long: &DataFrame) -> Result<usize> {
    let codes = require(long, COUNTRY_CODE)?.cast(&DataType::String)?;
    let codes = codes.as_materialized_series().str()?;
    let dates = require(long, DATE)?.cast(&DataType::Int32)?;
    let dates = dates.as_materialized_series().i32()?;

    let mut seen = HashSet::new();
    Ok(codes
        .into_iter()
        .zip(dates.into_iter())
        .filter(|key| !seen.insert(*key))
        .count())
}

/// Days since the Unix epoch of 1 January `year`
fn first_day_of_year(year: i32) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    i32::try_from(date.signed_duration_since(epoch).num_days()).ok()
}

fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| WrangleError::missing_column(name, df).into())
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
