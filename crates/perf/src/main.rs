//! taskcheck-perf - load experiments for the Todo Manager REST API

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;

use taskcheck_perf::output::{self, OutputFormat};
use taskcheck_perf::{ExperimentRunner, PerfConfig, ProfileKind};

/// Load and resource-usage experiments for the Todo Manager REST API
#[derive(Parser)]
#[command(name = "taskcheck-perf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the target server
    #[arg(long, default_value = "http://localhost:4567")]
    base_url: String,

    /// Resource kinds to exercise
    #[arg(long, value_delimiter = ',', default_values = ["todos", "projects", "categories"])]
    kinds: Vec<KindArg>,

    /// Object counts per experiment
    #[arg(long, value_delimiter = ',', default_values_t = [10, 100, 500, 1000])]
    loads: Vec<usize>,

    /// Resource sampler tick in milliseconds
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Pause between experiments in seconds
    #[arg(long, default_value_t = 1)]
    cooldown_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Output format
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Todos,
    Projects,
    Categories,
}

impl From<KindArg> for ProfileKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Todos => ProfileKind::Todos,
            KindArg::Projects => ProfileKind::Projects,
            KindArg::Categories => ProfileKind::Categories,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let config = PerfConfig {
        base_url: cli.base_url,
        request_timeout: Duration::from_secs(cli.timeout_secs),
        sample_interval: Duration::from_millis(cli.interval_ms),
        load_levels: cli.loads,
        cooldown: Duration::from_secs(cli.cooldown_secs),
    };

    let kinds: Vec<ProfileKind> = cli.kinds.into_iter().map(ProfileKind::from).collect();
    info!(
        "running {} kind(s) at load levels {:?}",
        kinds.len(),
        config.load_levels
    );

    let runner = ExperimentRunner::new(config);
    let results = runner.run(&kinds).await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        _ => {
            output::print_list(&results, cli.format);
            output::print_summary(&results);
        }
    }

    Ok(())
}
