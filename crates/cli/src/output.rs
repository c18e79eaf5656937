//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use planner_lib::{Severity, ValidationResult};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse a format name from the settings file
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Print a table from a list of rows, or the serializable items as JSON
pub fn print_table<R: Tabled, T: Serialize>(rows: &[R], items: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(items),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a section heading with an underline
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

pub fn color_severity(severity: Severity) -> String {
    let label = match severity {
        Severity::Error => "Errors:",
        Severity::Warning => "Warnings:",
        Severity::Recommendation => "Recommendations:",
    };
    match severity {
        Severity::Error => label.red().bold().to_string(),
        Severity::Warning => label.yellow().bold().to_string(),
        Severity::Recommendation => label.blue().bold().to_string(),
    }
}

/// Print validation diagnostics grouped by severity
pub fn print_diagnostics(validation: &ValidationResult) {
    let groups = [
        (Severity::Error, &validation.errors),
        (Severity::Warning, &validation.warnings),
        (Severity::Recommendation, &validation.recommendations),
    ];
    for (severity, messages) in groups {
        if messages.is_empty() {
            continue;
        }
        println!("{}", color_severity(severity));
        for message in messages {
            println!("  - {}", message);
        }
    }
}

/// Render a string map as `k=v, k=v`
pub fn format_labels<'a>(labels: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    let joined: Vec<String> = labels
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

/// Color a yes/no flag
pub fn format_flag(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".dimmed().to_string()
    }
}
