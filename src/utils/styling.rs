//! Terminal styling utilities

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
     ___                                _  _            _ _   _
    |_ _|_ _  __ ___ _ __  ___   ___   | || |___ __ _| | |_| |_
     | || ' \/ _/ _ \ '  \/ -_) |___|  | __ / -_) _` | |  _| ' \
    |___|_||_\__\___/_|_|_\___|        |_||_\___\__,_|_|\__|_||_|
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("$").magenta().bold(),
        style("GDP and mortality, wrangled into one tidy table").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(gdp_file: &Path, health_source: &str, output_dir: &Path, years: Option<(i32, i32)>) {
    let box_width = 60;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} GDP:     {:<42}│",
        FOLDER,
        truncate_path(gdp_file, 41)
    );
    println!(
        "    │  {} Health:  {:<42}│",
        GLOBE,
        truncate_string(health_source, 41)
    );
    println!(
        "    │  {} Output:  {:<42}│",
        SAVE,
        truncate_path(output_dir, 41)
    );
    println!("    ├{}┤", line);
    let window = match years {
        Some((from, to)) => format!("{}–{}", from, to),
        None => "all years".to_string(),
    };
    println!(
        "    │  {} Years:   {:<42}│",
        CALENDAR,
        style(window).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print a failure message to stderr
pub fn print_failure(message: &str) {
    eprintln!("    {} {}", style("✗").red().bold(), style(message).red());
}

/// Print how long a step took
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "      {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      {} {}", style(count).yellow().bold(), description);
    }
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Income-Health wrangling complete!").green().bold()
    );
    println!();
}

/// Print where a chart was written
pub fn print_chart(path: &Path) {
    println!("    {} {}", CHART, style(path.display()).dim());
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
