//! Tests for the join and the wide-to-long reshape

use income_health::pipeline::{
    combine, duplicate_keys, join_tables, latest_per_region, reshape_long, reshaped_year_columns,
    CombineOptions, HealthColumns, LONG_COLUMNS,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn all_years() -> CombineOptions {
    CombineOptions {
        years: None,
        ..CombineOptions::default()
    }
}

#[test]
fn test_latest_per_region() {
    let health = common::create_health_dataframe();

    let latest = latest_per_region(&health, &HealthColumns::default()).unwrap();

    assert_eq!(
        common::strings(&latest, "SpatialDim"),
        vec![Some("AFG".to_string()), Some("BRA".to_string()), Some("ZZZ".to_string())]
    );
    assert_eq!(common::floats(&latest, "Value"), vec![Some(12.5), Some(13.2), Some(8.1)]);
}

#[test]
fn test_latest_per_region_ties_keep_first_row() {
    let health = df! {
        "SpatialDim" => ["AFG", "AFG"],
        "TimeDim" => [2020i64, 2020],
        "IndicatorCode" => ["MORT_100", "MORT_100"],
        "Value" => [1.0f64, 2.0],
    }
    .unwrap();

    let latest = latest_per_region(&health, &HealthColumns::default()).unwrap();

    assert_eq!(common::floats(&latest, "Value"), vec![Some(1.0)]);
}

#[test]
fn test_latest_per_region_null_year_loses_and_order_is_kept() {
    let health = df! {
        "SpatialDim" => ["BRA", "AFG", "BRA", "AFG"],
        "TimeDim" => [None, Some(2018i64), Some(2015), Some(2019)],
        "IndicatorCode" => ["MORT_100"; 4],
        "Value" => [1.0f64, 2.0, 3.0, 4.0],
    }
    .unwrap();

    let latest = latest_per_region(&health, &HealthColumns::default()).unwrap();

    assert_eq!(
        common::column_names(&latest),
        vec!["SpatialDim", "TimeDim", "IndicatorCode", "Value"]
    );
    assert_eq!(
        common::strings(&latest, "SpatialDim"),
        vec![Some("BRA".to_string()), Some("AFG".to_string())]
    );
    assert_eq!(common::floats(&latest, "Value"), vec![Some(3.0), Some(4.0)]);
}

#[test]
fn test_join_keeps_only_shared_codes() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();

    let joined = join_tables(&health, &economic, &CombineOptions::default()).unwrap();

    assert_eq!(
        common::strings(&joined, "Country Code"),
        vec![Some("AFG".to_string()), Some("BRA".to_string())]
    );
    assert_eq!(
        common::strings(&joined, "Country"),
        common::strings(&joined, "Country Code"),
        "renamed region column should mirror the country code"
    );
}

#[test]
fn test_join_column_layout() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();

    let joined = join_tables(&health, &economic, &CombineOptions::default()).unwrap();

    assert_eq!(
        common::column_names(&joined),
        vec![
            "Country",
            "TimeDim",
            "IndicatorCode",
            "Mortality Rate",
            "Country Name",
            "Country Code",
            "Indicator Name",
            "Indicator Code",
            "2013",
            "2020",
            "2021",
        ]
    );
    common::assert_missing_columns(&joined, &["1960", "SpatialDim", "Value"]);
}

#[test]
fn test_join_uses_latest_health_row() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();

    let joined = join_tables(&health, &economic, &CombineOptions::default()).unwrap();

    assert_eq!(common::floats(&joined, "Mortality Rate"), vec![Some(12.5), Some(13.2)]);
}

#[test]
fn test_join_without_sentinel_keeps_1960() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();
    let options = CombineOptions {
        sentinel_column: None,
        ..CombineOptions::default()
    };

    let joined = join_tables(&health, &economic, &options).unwrap();

    common::assert_has_columns(&joined, &["1960"]);
}

#[test]
fn test_join_with_integer_region_codes() {
    let health = df! {
        "SpatialDim" => [4i64],
        "TimeDim" => [2020i64],
        "IndicatorCode" => ["MORT_100"],
        "Value" => [3.0f64],
    }
    .unwrap();
    let economic = df! {
        "Country Name" => ["Four"],
        "Country Code" => ["4"],
        "2020" => [1.0f64],
    }
    .unwrap();

    let joined = join_tables(&health, &economic, &CombineOptions::default()).unwrap();

    assert_eq!(joined.height(), 1);
}

#[test]
fn test_reshaped_year_columns_window() {
    let economic = common::create_economic_dataframe();

    assert_eq!(
        reshaped_year_columns(&economic, &CombineOptions::default()),
        vec!["2020", "2021"]
    );
    assert_eq!(reshaped_year_columns(&economic, &all_years()), vec!["2013", "2020", "2021"]);

    let everything = CombineOptions {
        sentinel_column: None,
        years: None,
        ..CombineOptions::default()
    };
    assert_eq!(
        reshaped_year_columns(&economic, &everything),
        vec!["1960", "2013", "2020", "2021"]
    );
}

#[test]
fn test_reshape_is_year_major() {
    let combined = combine(
        &common::create_health_dataframe(),
        &common::create_economic_dataframe(),
        &CombineOptions::default(),
    )
    .unwrap();
    let long = &combined.long;

    assert_eq!(common::column_names(long), LONG_COLUMNS.to_vec());
    assert_eq!(
        common::strings(long, "Country Code"),
        vec![
            Some("AFG".to_string()),
            Some("BRA".to_string()),
            Some("AFG".to_string()),
            Some("BRA".to_string()),
        ]
    );
    assert_eq!(
        common::years_of(long, "Date"),
        vec![Some(2020), Some(2020), Some(2021), Some(2021)]
    );
    assert_eq!(
        common::floats(long, "GDP"),
        vec![Some(20.1e9), Some(1.47e12), Some(14.3e9), Some(1.67e12)]
    );
    assert_eq!(
        common::floats(long, "Mortality Rate"),
        vec![Some(12.5), Some(13.2), Some(12.5), Some(13.2)]
    );
    assert_eq!(long.column("Date").unwrap().dtype(), &DataType::Date);
}

#[test]
fn test_reshape_row_count_law() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();
    let options = all_years();

    let combined = combine(&health, &economic, &options).unwrap();

    let years = reshaped_year_columns(&combined.combined, &options).len();
    assert_eq!(combined.long.height(), combined.combined.height() * years);
    assert_eq!(duplicate_keys(&combined.long).unwrap(), 0);
}

#[test]
fn test_reshape_row_count_law_large() {
    let combined = common::create_large_combined_dataframe(250, 1990..=2023);
    let options = CombineOptions {
        years: None,
        sentinel_column: None,
        ..CombineOptions::default()
    };

    let long = reshape_long(&combined, &options).unwrap();

    assert_eq!(long.height(), 250 * 34);
    assert_eq!(duplicate_keys(&long).unwrap(), 0);
    assert_eq!(long.column("Date").unwrap().null_count(), 0);
}

#[test]
fn test_reshape_keeps_missing_gdp_by_default() {
    let health = df! {
        "SpatialDim" => ["ABW"],
        "TimeDim" => [2020i64],
        "IndicatorCode" => ["MORT_100"],
        "Value" => [7.0f64],
    }
    .unwrap();
    let economic = common::create_economic_dataframe();

    let kept = combine(&health, &economic, &CombineOptions::default()).unwrap();
    assert_eq!(common::floats(&kept.long, "GDP"), vec![None, Some(2.9e9)]);

    let options = CombineOptions {
        drop_missing_gdp: true,
        ..CombineOptions::default()
    };
    let dropped = combine(&health, &economic, &options).unwrap();
    assert_eq!(common::floats(&dropped.long, "GDP"), vec![Some(2.9e9)]);
    assert_eq!(common::years_of(&dropped.long, "Date"), vec![Some(2021)]);
}

#[test]
fn test_combine_without_shared_codes() {
    let health = df! {
        "SpatialDim" => ["ZZZ"],
        "TimeDim" => [2020i64],
        "IndicatorCode" => ["MORT_100"],
        "Value" => [8.1f64],
    }
    .unwrap();
    let economic = common::create_economic_dataframe();

    let combined = combine(&health, &economic, &CombineOptions::default()).unwrap();

    assert_eq!(combined.combined.height(), 0);
    assert_eq!(combined.long.height(), 0);
    assert_eq!(common::column_names(&combined.long), LONG_COLUMNS.to_vec());
}

#[test]
fn test_reshape_with_empty_year_window() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();
    let options = CombineOptions {
        years: Some(1900..=1901),
        ..CombineOptions::default()
    };

    let combined = combine(&health, &economic, &options).unwrap();

    assert_eq!(combined.combined.height(), 2);
    assert_eq!(combined.long.height(), 0);
    assert_eq!(common::column_names(&combined.long), LONG_COLUMNS.to_vec());
    assert_eq!(combined.long.column("GDP").unwrap().dtype(), &DataType::Float64);
}

#[test]
fn test_combine_is_deterministic() {
    let health = common::create_health_dataframe();
    let economic = common::create_economic_dataframe();

    let first = combine(&health, &economic, &CombineOptions::default()).unwrap();
    let second = combine(&health, &economic, &CombineOptions::default()).unwrap();

    assert!(first.combined.equals_missing(&second.combined));
    assert!(first.long.equals_missing(&second.long));
}

#[test]
fn test_duplicate_keys_counts_repeats() {
    let long = df! {
        "Country Code" => ["AFG", "AFG", "BRA"],
        "Date" => [18262i32, 18262, 18262],
    }
    .unwrap();
    let mut long = long;
    let date = long.column("Date").unwrap().cast(&DataType::Date).unwrap();
    long.with_column(date).unwrap();

    assert_eq!(duplicate_keys(&long).unwrap(), 1);
}
