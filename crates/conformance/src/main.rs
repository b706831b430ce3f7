//! taskcheck - conformance suite runner for the Todo Manager REST API

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use tracing::info;

use taskcheck_conformance::output::{self, OutputFormat, TableDisplay};
use taskcheck_conformance::{
    suites, HarnessConfig, RunnerConfig, ServerConfig, SuiteRunner, TestSpec,
};

/// Black-box conformance tests for the Todo Manager REST API
#[derive(Parser)]
#[command(name = "taskcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the target server
    #[arg(long, default_value = "http://localhost:4567", global = true)]
    base_url: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or all conformance suites
    Run {
        /// Which suite to run
        #[arg(long, default_value = "all")]
        suite: SuiteArg,

        /// Shuffle execution order
        #[arg(long)]
        shuffle: bool,

        /// Shuffle seed (random when omitted); printed so failures reproduce
        #[arg(long)]
        seed: Option<u64>,

        /// Path to the server jar; when set, a fresh server is spawned
        /// before every case for full isolation
        #[arg(long)]
        server_jar: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },

    /// List the cases in one or all suites
    List {
        #[arg(long, default_value = "all")]
        suite: SuiteArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SuiteArg {
    Todos,
    Projects,
    Categories,
    All,
}

impl SuiteArg {
    fn specs(self) -> Vec<TestSpec> {
        match self {
            SuiteArg::Todos => suites::todos::specs(),
            SuiteArg::Projects => suites::projects::specs(),
            SuiteArg::Categories => suites::categories::specs(),
            SuiteArg::All => {
                let mut specs = suites::todos::specs();
                specs.extend(suites::projects::specs());
                specs.extend(suites::categories::specs());
                specs
            }
        }
    }
}

#[derive(serde::Serialize)]
struct CaseListing {
    name: String,
    method: String,
    endpoint: String,
}

impl TableDisplay for CaseListing {
    fn headers() -> Vec<&'static str> {
        vec!["Case", "Method", "Endpoint"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.method.clone(), self.endpoint.clone()]
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

    match cli.command {
        Commands::Run {
            suite,
            shuffle,
            seed,
            server_jar,
            timeout_secs,
        } => {
            let shuffle_seed = match (shuffle, seed) {
                (false, _) => None,
                (true, Some(seed)) => Some(seed),
                (true, None) => Some(rand::thread_rng().gen()),
            };

            let server = server_jar.map(|jar_path| ServerConfig {
                jar_path,
                base_url: cli.base_url.clone(),
                ..Default::default()
            });

            let config = RunnerConfig {
                harness: HarnessConfig {
                    base_url: cli.base_url,
                    timeout: Duration::from_secs(timeout_secs),
                },
                shuffle_seed,
                server,
            };

            info!("running suite: {:?}", suite);
            let runner = SuiteRunner::new(config, suite.specs());
            let report = runner.run().await?;

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                _ => {
                    output::print_list(&report.results, cli.format);
                    output::print_summary(&report);
                }
            }

            if report.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::List { suite } => {
            let listings: Vec<CaseListing> = suite
                .specs()
                .into_iter()
                .map(|spec| CaseListing {
                    name: spec.name,
                    method: spec.method.to_string(),
                    endpoint: spec.endpoint,
                })
                .collect();
            output::print_list(&listings, cli.format);
        }
    }

    Ok(())
}
