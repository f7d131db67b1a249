//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// World Bank style extract: three metadata lines, the header (row 3) and
/// two countries. Every line ends with a trailing comma, as the real
/// download does, which yields one fully empty column.
pub const GDP_CSV: &str = "\
\"Data Source\",\"World Development Indicators\",
\"Last Updated Date\",\"2024-06-28\",
\"Notes\",\"GDP (current US$)\",
\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"2020\",\"2021\",
\"Aruba\",\"ABW\",\"GDP (current US$)\",\"NY.GDP.MKTP.CD\",\"2481857680.9\",\"2929446927.4\",
\"Afghanistan\",\"AFG\",\"GDP (current US$)\",\"NY.GDP.MKTP.CD\",\"20143441653.6\",\"14266499429.9\",
";

/// GHO style response: one region shared with [`GDP_CSV`] (`AFG`), one that
/// is not (`ZZZ`) and one row whose value is not numeric.
pub const HEALTH_JSON: &str = r#"{
  "@odata.context": "https://ghoapi.azureedge.net/api/$metadata#MORT_100",
  "value": [
    {"Id": 101, "IndicatorCode": "MORT_100", "SpatialDimType": "COUNTRY", "SpatialDim": "AFG",
     "TimeDimType": "YEAR", "TimeDim": 2020, "Dim1": null, "Value": "12.5",
     "NumericValue": 12.5, "Low": null, "High": null, "Comments": null},
    {"Id": 102, "IndicatorCode": "MORT_100", "SpatialDimType": "COUNTRY", "SpatialDim": "ZZZ",
     "TimeDimType": "YEAR", "TimeDim": 2020, "Dim1": null, "Value": "8.1",
     "NumericValue": 8.1, "Low": null, "High": null, "Comments": null},
    {"Id": 103, "IndicatorCode": "MORT_100", "SpatialDimType": "COUNTRY", "SpatialDim": "ABW",
     "TimeDimType": "YEAR", "TimeDim": 2020, "Dim1": null, "Value": "N/A",
     "NumericValue": null, "Low": null, "High": null, "Comments": null}
  ]
}"#;

/// Write `contents` to `name` inside a fresh temporary directory
pub fn create_temp_file(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

/// Temporary directory holding both fixture files
pub fn create_fixture_dir() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let gdp_path = temp_dir.path().join("gdp.csv");
    let health_path = temp_dir.path().join("mort_100.json");
    std::fs::write(&gdp_path, GDP_CSV).unwrap();
    std::fs::write(&health_path, HEALTH_JSON).unwrap();
    (temp_dir, gdp_path, health_path)
}

/// Cleaned economic table with three year columns plus the 1960 sentinel
pub fn create_economic_dataframe() -> DataFrame {
    df! {
        "Country Name" => ["Afghanistan", "Aruba", "Brazil"],
        "Country Code" => ["AFG", "ABW", "BRA"],
        "Indicator Name" => ["GDP (current US$)"; 3],
        "Indicator Code" => ["NY.GDP.MKTP.CD"; 3],
        "1960" => [None::<f64>, None, Some(15.2e9)],
        "2013" => [Some(20.5e9), Some(2.7e9), Some(2.47e12)],
        "2020" => [Some(20.1e9), None, Some(1.47e12)],
        "2021" => [Some(14.3e9), Some(2.9e9), Some(1.67e12)],
    }
    .unwrap()
}

/// Cleaned health table; `BRA` has two years, `ZZZ` has no GDP counterpart
pub fn create_health_dataframe() -> DataFrame {
    df! {
        "SpatialDim" => ["BRA", "AFG", "BRA", "ZZZ"],
        "TimeDim" => [2019i64, 2020, 2021, 2020],
        "IndicatorCode" => ["MORT_100"; 4],
        "Value" => [14.0f64, 12.5, 13.2, 8.1],
    }
    .unwrap()
}

/// Large combined table for performance tests
pub fn create_large_combined_dataframe(countries: usize, years: std::ops::RangeInclusive<i32>) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let codes: Vec<String> = (0..countries).map(|i| format!("C{:04}", i)).collect();
    let mut columns = vec![
        Column::new("Country".into(), codes.clone()),
        Column::new("IndicatorCode".into(), vec!["MORT_100"; countries]),
        Column::new(
            "Mortality Rate".into(),
            (0..countries).map(|_| rng.gen_range(5.0..40.0)).collect::<Vec<f64>>(),
        ),
        Column::new(
            "Country Name".into(),
            codes.iter().map(|c| format!("Country {}", c)).collect::<Vec<_>>(),
        ),
        Column::new("Country Code".into(), codes),
    ];
    for year in years {
        let values: Vec<Option<f64>> = (0..countries)
            .map(|_| rng.gen_bool(0.9).then(|| rng.gen_range(1e8..1e13)))
            .collect();
        columns.push(Column::new(year.to_string().into(), values));
    }

    DataFrame::new(columns).unwrap()
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols = column_names(df);
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// String values of a column, nulls as `None`
pub fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    let column = df.column(name).unwrap().cast(&DataType::String).unwrap();
    column
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

/// Float values of a column, nulls as `None`
pub fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    let column = df.column(name).unwrap().cast(&DataType::Float64).unwrap();
    column.as_materialized_series().f64().unwrap().into_iter().collect()
}

/// Calendar year of each value in a Date column
pub fn years_of(df: &DataFrame, name: &str) -> Vec<Option<i32>> {
    use chrono::Datelike;
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let column = df.column(name).unwrap().cast(&DataType::Int32).unwrap();
    column
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_iter()
        .map(|days| days.map(|d| (epoch + chrono::Duration::days(d as i64)).year()))
        .collect()
}
