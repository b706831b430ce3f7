//! Error types for the performance harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerfError {
    #[error("target server is not reachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type PerfResult<T> = Result<T, PerfError>;
