//! Structural conformance test engine for the Todo Manager REST API
//!
//! Executes declarative test specifications against a running server:
//! each spec describes one HTTP request plus its expected status, headers
//! and a containment-based body template. Responses are validated with a
//! recursive structural matcher that tolerates extra fields and ignores
//! the order of id-keyed lists.

pub mod client;
pub mod config;
pub mod error;
pub mod matcher;
pub mod output;
pub mod runner;
pub mod server;
pub mod spec;
pub mod suites;
pub mod xml;

pub use client::{Exchange, HttpClient};
pub use config::HarnessConfig;
pub use error::{CheckError, CheckResult};
pub use matcher::{Expected, Mismatch};
pub use runner::{CaseReport, RunnerConfig, SpecRunner, SuiteReport, SuiteRunner};
pub use server::{ServerConfig, ServerHandle};
pub use spec::{Encoding, IdSource, Method, RequestBody, ResourceKind, SetupObject, TestSpec};
