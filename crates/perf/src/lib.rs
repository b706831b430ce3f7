//! Load and resource-usage experiments for the Todo Manager REST API
//!
//! The harness runs timed create/update/delete/get batches against each
//! collection at increasing load levels, sampling system CPU and free
//! memory against an idle baseline while each phase runs.

pub mod config;
pub mod error;
pub mod experiment;
pub mod monitor;
pub mod output;
pub mod tester;

pub use config::PerfConfig;
pub use error::{PerfError, PerfResult};
pub use experiment::{ExperimentRunner, ProfileKind};
pub use monitor::{ResourceMonitor, ResourceStats};
pub use tester::{
    CategoryProfile, ExperimentResult, PerformanceTester, PhaseStats, ProjectProfile, TodoProfile,
};
