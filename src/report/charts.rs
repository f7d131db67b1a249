//! Static charts answering the GDP vs mortality question

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use plotters::prelude::{
    BitMapBackend, ChartBuilder, Circle, Color, IntoDrawingArea, LineSeries, Palette, Palette99,
    PathElement, SeriesLabelPosition, BLACK, BLUE, WHITE,
};
use polars::prelude::*;

use crate::pipeline::{COUNTRY_CODE, COUNTRY_NAME, DATE, GDP, MORTALITY_RATE};

pub const SCATTER_FILE: &str = "gdp_vs_mortality.png";
pub const TIMESERIES_FILE: &str = "gdp_over_time.png";

const CHART_SIZE: (u32, u32) = (1200, 700);

/// (year, GDP) points per country name, ordered by name then year
pub type GdpSeries = BTreeMap<String, Vec<(i32, f64)>>;

/// (GDP, mortality rate) pairs of every long row with both values present
pub fn scatter_points(long: &DataFrame) -> Result<Vec<(f64, f64)>> {
    let gdp = long.column(GDP)?.cast(&DataType::Float64)?;
    let mortality = long.column(MORTALITY_RATE)?.cast(&DataType::Float64)?;

    let points = gdp
        .as_materialized_series()
        .f64()?
        .into_iter()
        .zip(mortality.as_materialized_series().f64()?.into_iter())
        .filter_map(|(gdp, mortality)| Some((gdp?, mortality?)))
        .collect();

    Ok(points)
}

/// GDP over time, one series per country.
///
/// Rows without a GDP value or date are skipped; a missing country name
/// falls back to the country code.
pub fn gdp_series(long: &DataFrame) -> Result<GdpSeries> {
    let names = long.column(COUNTRY_NAME)?.cast(&DataType::String)?;
    let codes = long.column(COUNTRY_CODE)?.cast(&DataType::String)?;
    let days = long.column(DATE)?.cast(&DataType::Int32)?;
    let gdp = long.column(GDP)?.cast(&DataType::Float64)?;

    let names = names.as_materialized_series().str()?;
    let codes = codes.as_materialized_series().str()?;
    let days = days.as_materialized_series().i32()?;
    let gdp = gdp.as_materialized_series().f64()?;

    let mut series = GdpSeries::new();
    for (((name, code), day), value) in names
        .into_iter()
        .zip(codes.into_iter())
        .zip(days.into_iter())
        .zip(gdp.into_iter())
    {
        let (Some(day), Some(value)) = (day, value) else {
            continue;
        };
        let Some(year) = year_of(day) else {
            continue;
        };
        let label = name.or(code).unwrap_or("<unknown>").to_string();
        series.entry(label).or_default().push((year, value));
    }

    for points in series.values_mut() {
        points.sort_by_key(|(year, _)| *year);
    }

    Ok(series)
}

/// Scatter of GDP (x) against mortality rate (y)
pub fn render_scatter(points: &[(f64, f64)], path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption("GDP vs Mortality Rate", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("GDP (Current US$)")
        .y_desc("Mortality Rate")
        .x_label_formatter(&|v| format_gdp(*v))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.5).filled())),
    )?;

    root.present()?;
    Ok(())
}

/// One GDP line per country over the years, with a legend
pub fn render_gdp_over_time(series: &GdpSeries, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let years: Vec<i32> = series.values().flatten().map(|(year, _)| *year).collect();
    let first = years.iter().copied().min().unwrap_or(2014);
    let last = years.iter().copied().max().unwrap_or(first);
    let y_range = padded_range(series.values().flatten().map(|(_, gdp)| *gdp));

    let mut chart = ChartBuilder::on(&root)
        .caption("GDP Over Time for Different Countries", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last + 1, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("GDP (Current US$)")
        .y_label_formatter(&|v| format_gdp(*v))
        .draw()?;

    for (index, (country, points)) in series.iter().enumerate() {
        let color = Palette99::pick(index).mix(0.9);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(country.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            points
                .iter()
                .map(|&(year, gdp)| Circle::new((year, gdp), 3, color.filled())),
        )?;
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Axis range covering the values with 5% padding on each side
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return 0.0..1.0;
    }
    let pad = if max > min { (max - min) * 0.05 } else { min.abs().max(1.0) * 0.05 };
    (min - pad)..(max + pad)
}

fn format_gdp(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.1}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else {
        format!("{:.1}", value)
    }
}

fn year_of(days_since_epoch: i32) -> Option<i32> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    epoch
        .checked_add_signed(Duration::days(i64::from(days_since_epoch)))
        .map(|date| date.year())
}
