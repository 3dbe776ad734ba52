use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a catalog load. Everything else degrades to defaults.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to load {what}: request to {url} failed")]
    Fetch {
        what: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to load {what}: {status}")]
    Status {
        what: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Failed to load {what}: cannot read {path:?}")]
    Read {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load {what}: unsupported location {url}")]
    UnsupportedScheme { what: &'static str, url: String },

    #[error("Invalid base location {base}: {reason}")]
    InvalidBase { base: String, reason: String },
}
