//! Income-Health: GDP and Mortality Wrangling CLI
//!
//! Gathers the World Bank GDP extract and the WHO mortality indicator,
//! assesses and cleans both, combines them into a tidy long table, stores
//! raw and cleaned snapshots and charts the result.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use polars::prelude::DataFrame;
use tracing_subscriber::EnvFilter;

use income_health::cli::Cli;
use income_health::pipeline::{
    analyze_missing_values, clean_economic, clean_health, combine, dataset_stats,
    duplicate_keys, fetch_health_json, fully_missing_columns, load_delimited, load_health_file,
    persist_snapshots, reshaped_year_columns,
};
use income_health::report::{
    export_run_report, gdp_series, print_missing_profile, render_gdp_over_time, render_scatter,
    report_metadata, scatter_points, Profiles, RunReport, RunSummary, SCATTER_FILE,
    TIMESERIES_FILE,
};
use income_health::utils::{
    create_spinner, finish_with_failure, finish_with_success, finish_with_warning, print_banner,
    print_chart, print_completion, print_config, print_count, print_failure, print_info,
    print_step_header, print_step_time, print_success, print_warning,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(message) = cli.validate() {
        anyhow::bail!(message);
    }

    init_tracing(cli.verbose);

    let options = cli.combine_options();
    let snapshot_paths = cli.snapshot_paths();
    let health_source = cli.health_source();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.gdp_file, &health_source, &cli.output_dir, cli.year_window());

    let mut summary = RunSummary::new();

    // Step 1: Gather both datasets
    print_step_header(1, "Gather Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading GDP file...");
    let raw_economic = match load_delimited(&cli.gdp_file) {
        Ok(raw) => raw,
        Err(err) => {
            finish_with_failure(&spinner, "Failed to load GDP file");
            print_failure(&format!("{:#}", err));
            return Err(err);
        }
    };
    if raw_economic.skipped_rows > 0 {
        finish_with_warning(
            &spinner,
            &format!("GDP file loaded, {} malformed line(s) skipped", raw_economic.skipped_rows),
        );
    } else {
        finish_with_success(&spinner, "GDP file loaded");
    }
    print_table_stats(&raw_economic.table);

    let spinner = create_spinner("Fetching health indicator data...");
    let health_result = match &cli.health_file {
        Some(path) => load_health_file(path, &cli.health_field),
        None => fetch_health_json(&cli.health_url, &cli.health_field),
    };
    let raw_health = match health_result {
        Ok(df) => df,
        Err(err) => {
            // No retry: report and skip every downstream stage
            finish_with_failure(&spinner, "Health indicator data unavailable");
            print_failure(&format!("{:#}", err));
            return Err(err);
        }
    };
    finish_with_success(&spinner, "Health indicator data loaded");
    print_table_stats(&raw_health);

    summary.economic_raw_rows = raw_economic.table.height();
    summary.economic_skipped_rows = raw_economic.skipped_rows;
    summary.health_raw_rows = raw_health.height();
    let elapsed = step_start.elapsed();
    summary.record_time("gather", elapsed);
    print_step_time(elapsed);

    // Step 2: Assess missing values
    print_step_header(2, "Assess Data");

    let step_start = Instant::now();
    let economic_profile = analyze_missing_values(&raw_economic.table)?;
    let health_profile = analyze_missing_values(&raw_health)?;
    print_missing_profile("GDP (raw)", &economic_profile, raw_economic.table.height());
    print_missing_profile("Health (raw)", &health_profile, raw_health.height());

    let empty_health_columns = fully_missing_columns(&health_profile, raw_health.height());
    if !empty_health_columns.is_empty() {
        print_count(
            "health column(s) entirely empty",
            empty_health_columns.len(),
            Some(&format!("({})", empty_health_columns.join(", "))),
        );
    }
    let elapsed = step_start.elapsed();
    summary.record_time("assess", elapsed);
    print_step_time(elapsed);

    // Step 3: Clean
    print_step_header(3, "Clean Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Cleaning GDP table...");
    let economic = clean_economic(&raw_economic.table)?;
    finish_with_success(
        &spinner,
        &format!("GDP table cleaned ({} countries, {} columns)", economic.height(), economic.width()),
    );

    let spinner = create_spinner("Cleaning health table...");
    let health = clean_health(&raw_health, &options.health)?;
    finish_with_success(
        &spinner,
        &format!("Health table cleaned ({} rows)", health.table.height()),
    );
    if health.rejections.count > 0 {
        print_count(
            "health row(s) dropped",
            health.rejections.count,
            Some("(value not numeric)"),
        );
    }

    summary.economic_rows = economic.height();
    summary.health_rows = health.table.height();
    summary.rejections = health.rejections.clone();
    let elapsed = step_start.elapsed();
    summary.record_time("clean", elapsed);
    print_step_time(elapsed);

    // Step 4: Combine and reshape
    print_step_header(4, "Combine Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Joining and reshaping...");
    let combined = combine(&health.table, &economic, &options)?;
    let reshaped_years = reshaped_year_columns(&combined.combined, &options).len();
    finish_with_success(&spinner, "Tables combined");

    if combined.combined.height() == 0 {
        print_warning("No country code is shared by both tables");
    } else {
        print_count("country(ies) in both tables", combined.combined.height(), None);
    }
    print_count(
        "long row(s)",
        combined.long.height(),
        Some(&format!("({} year column(s))", reshaped_years)),
    );

    let duplicates = duplicate_keys(&combined.long)?;
    if duplicates > 0 {
        print_warning(&format!("{} duplicate (country, date) key(s)", duplicates));
    }

    summary.combined_rows = combined.combined.height();
    summary.reshaped_years = reshaped_years;
    summary.long_rows = combined.long.height();
    summary.duplicate_keys = duplicates;
    let elapsed = step_start.elapsed();
    summary.record_time("combine", elapsed);
    print_step_time(elapsed);

    // Step 5: Store snapshots
    print_step_header(5, "Store Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing snapshots...");
    let written = persist_snapshots(&combined.combined, &combined.long, &snapshot_paths)?;
    finish_with_success(&spinner, "Snapshots written");
    print_success(&format!("Raw data saved to: {}", written.raw.display()));
    print_success(&format!("Cleaned data saved to: {}", written.cleaned.display()));
    let elapsed = step_start.elapsed();
    summary.record_time("store", elapsed);
    print_step_time(elapsed);

    // Step 6: Visualise
    print_step_header(6, "Visualize");

    let step_start = Instant::now();
    if cli.no_charts {
        print_info("Chart rendering skipped (--no-charts)");
    } else {
        let spinner = create_spinner("Rendering charts...");
        let scatter_path = cli.chart_path(SCATTER_FILE);
        let series_path = cli.chart_path(TIMESERIES_FILE);
        render_scatter(&scatter_points(&combined.long)?, &scatter_path)?;
        render_gdp_over_time(&gdp_series(&combined.long)?, &series_path)?;
        finish_with_success(&spinner, "Charts rendered");
        print_chart(&scatter_path);
        print_chart(&series_path);
    }
    let elapsed = step_start.elapsed();
    summary.record_time("visualize", elapsed);
    print_step_time(elapsed);

    summary.display();

    if let Some(report_path) = &cli.report {
        let metadata = report_metadata(
            &cli.gdp_file,
            &health_source,
            &written.raw,
            &written.cleaned,
            cli.year_window(),
        );
        let profiles = Profiles {
            economic: economic_profile,
            health: health_profile,
        };
        export_run_report(&RunReport::new(metadata, profiles, &summary), report_path)?;
        println!();
        print_success(&format!("Run report saved to: {}", report_path.display()));
    }

    print_completion();

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "income_health=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_table_stats(df: &DataFrame) {
    let (rows, cols, memory_mb) = dataset_stats(df);
    println!(
        "      {} {} rows × {} columns, {:.2} MB",
        style("✧").cyan(),
        rows,
        cols,
        memory_mb
    );
}
