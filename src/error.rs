//! Error types for sponsor-sync

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the environment-supplied configuration. All of these abort
/// the run before any network call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable required")]
    MissingCredential(&'static str),

    #[error("{name} is not a valid URL: {source}")]
    InvalidEndpoint {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be a positive integer, got: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// A single HTTP attempt that failed. These are retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to encode request params: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why an otherwise delivered page was refused. Rejection halts pagination.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageRejection {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("API returned error code ec={ec:?}, em={em:?}")]
    ErrorCode { ec: Option<i64>, em: Option<String> },

    #[error("data.list is not an array")]
    ListNotArray,
}

/// Per-record failure. Records that fail are dropped and counted, never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("profile record has no user id")]
    MissingId,

    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(i64),
}

/// File output failures.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Conditions that stop a synchronization run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to fetch transactions: {0:#}")]
    TransactionFetch(anyhow::Error),

    #[error("no transaction records fetched, nothing to render")]
    NoTransactions,

    #[error("failed to write snapshot: {0}")]
    Artifact(#[source] OutputError),
}
