//! Output formatting for the taskcheck CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::runner::{CaseReport, SuiteReport};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for CaseReport {
    fn headers() -> Vec<&'static str> {
        vec!["Case", "Result", "Duration", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            if self.passed { "✓" } else { "✗" }.to_string(),
            format!("{}ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                for (header, value) in T::headers().iter().zip(item.row().iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print the pass/fail summary line for a suite run
pub fn print_summary(report: &SuiteReport) {
    let passed = format!("{} passed", report.passed).green();
    let failed = if report.failed > 0 {
        format!("{} failed", report.failed).red().bold()
    } else {
        format!("{} failed", report.failed).normal()
    };
    println!();
    println!(
        "{} {passed}, {failed} of {} case(s) in {}ms",
        if report.failed == 0 {
            "✓".green()
        } else {
            "✗".red()
        },
        report.total,
        report.duration_ms
    );
}
