//! Error types for the library seams
//!
//! Skipped fragments (no id, ad content, missing price) are not errors and
//! never show up here; they are filtered out during extraction.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to parse {name} selector {selector:?}: {reason}")]
    Selector {
        name: &'static str,
        selector: String,
        reason: String,
    },
    #[error("failed to compile {name} pattern: {source}")]
    Pattern {
        name: &'static str,
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seen store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("seen store is not a JSON array of ids: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sink rejected message [{status}]: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}
