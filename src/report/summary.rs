//! Terminal summaries of a wrangling run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{MissingCount, Rejections};

/// Row counts and timings collected while the pipeline runs
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub economic_raw_rows: usize,
    pub economic_skipped_rows: usize,
    pub economic_rows: usize,
    pub health_raw_rows: usize,
    pub health_rows: usize,
    pub rejections: Rejections,
    pub combined_rows: usize,
    pub reshaped_years: usize,
    pub long_rows: usize,
    pub duplicate_keys: usize,
    pub timings: Vec<(String, Duration)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_time(&mut self, stage: &str, elapsed: Duration) {
        self.timings.push((stage.to_string(), elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Stage").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 GDP file (raw lines)"),
            Cell::new(self.economic_raw_rows),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  GDP malformed lines"),
            Cell::new(self.economic_skipped_rows).fg(highlight(self.economic_skipped_rows)),
        ]);
        table.add_row(vec![
            Cell::new("🧹 GDP cleaned"),
            Cell::new(self.economic_rows),
        ]);
        table.add_row(vec![
            Cell::new("📁 Health records (raw)"),
            Cell::new(self.health_raw_rows),
        ]);
        table.add_row(vec![
            Cell::new("🗑️  Health rejected (non-numeric)"),
            Cell::new(self.rejections.count).fg(highlight(self.rejections.count)),
        ]);
        table.add_row(vec![
            Cell::new("🧹 Health cleaned"),
            Cell::new(self.health_rows),
        ]);
        table.add_row(vec![
            Cell::new("🔗 Combined (joined)"),
            Cell::new(self.combined_rows),
        ]);
        table.add_row(vec![
            Cell::new("📅 Year columns reshaped"),
            Cell::new(self.reshaped_years),
        ]);
        table.add_row(vec![
            Cell::new("✅ Long table"),
            Cell::new(self.long_rows)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        if self.duplicate_keys > 0 {
            table.add_row(vec![
                Cell::new("❗ Duplicate (country, date) keys"),
                Cell::new(self.duplicate_keys).fg(Color::Red),
            ]);
        }

        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())).fg(Color::Cyan),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.rejections.sample.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Rejected values").yellow(),
                style(format!("(first {})", self.rejections.sample.len())).dim()
            );
            for value in &self.rejections.sample {
                println!("        {} {}", style("•").dim(), value);
            }
        }
    }
}

/// Print the columns of a table that have missing values
pub fn print_missing_profile(title: &str, profile: &[MissingCount], height: usize) {
    println!();
    println!(
        "    {} {} {}",
        style("✧").cyan(),
        style(title).white().bold(),
        style(format!("({} rows)", height)).dim()
    );

    if profile.is_empty() {
        println!("      No missing values");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Column").add_attribute(Attribute::Bold),
        Cell::new("Missing").add_attribute(Attribute::Bold),
        Cell::new("Ratio").add_attribute(Attribute::Bold),
    ]);

    for entry in profile {
        let color = if entry.count == height {
            Color::Red
        } else if entry.ratio > 0.5 {
            Color::Yellow
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(&entry.column),
            Cell::new(entry.count).fg(color),
            Cell::new(format!("{:.1}%", entry.ratio * 100.0)).fg(color),
        ]);
    }

    for line in table.to_string().lines() {
        println!("      {}", line);
    }
}

fn highlight(count: usize) -> Color {
    if count == 0 {
        Color::White
    } else {
        Color::Yellow
    }
}
