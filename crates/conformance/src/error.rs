//! Error types for the conformance engine

use thiserror::Error;

use crate::matcher::Mismatch;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("request failed: {method} {url}: {source}")]
    Connection {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("expected status {expected:?}, got {actual} (body: {body_excerpt})")]
    StatusMismatch {
        expected: Vec<u16>,
        actual: u16,
        body_excerpt: String,
    },

    #[error("expected a parseable response body, got: {0}")]
    BodyParse(String),

    #[error("response body mismatch {0}")]
    BodyMismatch(Mismatch),

    #[error("missing expected header '{0}'")]
    HeaderMissing(String),

    #[error("header '{name}' should be '{expected}', got '{actual}'")]
    HeaderMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("HEAD response carries a body ({0} bytes)")]
    HeadBody(usize),

    #[error("setup object creation failed: {0}")]
    Setup(String),

    #[error("invalid test spec '{name}': {reason}")]
    InvalidSpec { name: String, reason: String },

    #[error("server failed to start: {0}")]
    ServerStartup(String),

    #[error("server did not reach a clean state after {0} attempts")]
    ServerNotReady(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type CheckResult<T> = Result<T, CheckError>;
