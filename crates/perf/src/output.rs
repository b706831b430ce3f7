//! Output formatting for the taskcheck-perf CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::tester::ExperimentResult;

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

impl TableDisplay for ExperimentResult {
    fn headers() -> Vec<&'static str> {
        vec![
            "Endpoint",
            "Objects",
            "Create (s)",
            "Update (s)",
            "Delete (s)",
            "Get (s)",
            "CPU Δ (%)",
            "Mem Δ (MB)",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.endpoint.clone(),
            self.load.to_string(),
            format!("{:.4}", self.create.seconds),
            format!("{:.4}", self.update.seconds),
            format!("{:.4}", self.delete.seconds),
            format!("{:.4}", self.get.seconds),
            format!("{:.2}", self.create.resources.cpu_increase),
            format!("{:.2}", self.create.resources.mem_consumed_mb),
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

/// Print the closing line for a batch of experiments
pub fn print_summary(results: &[ExperimentResult]) {
    println!();
    println!(
        "{} {} experiment(s) completed",
        "✓".green(),
        results.len()
    );
}
