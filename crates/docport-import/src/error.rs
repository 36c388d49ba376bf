//! Error types for the importer
//!
//! Messages are user-facing: each one says what went wrong and, where there
//! is an obvious fix, how to fix it.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    /// Neither deployment URL variable is set
    #[error("Missing deployment URL: set {primary} (or {fallback}) in the environment or a .env.local file.")]
    MissingDeploymentUrl {
        primary: &'static str,
        fallback: &'static str,
    },

    /// A setting is present but unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// A CSV file could not be read from disk
    #[error("Failed to read '{path}': {source}")]
    ReadCsv {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data directory could not be listed
    #[error("Failed to scan data directory '{path}': {source}")]
    ScanDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request to the store failed before a reply arrived
    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered but refused the document
    #[error("Store rejected insert into '{table}': {message}")]
    Rejected { table: String, message: String },
}

impl ImportError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn rejected(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            table: table.into(),
            message: message.into(),
        }
    }
}
