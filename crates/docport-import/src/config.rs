//! Importer configuration
//!
//! Settings come from the process environment. `.env.local` and `.env` in
//! the data directory are loaded first without overriding variables that
//! are already set, the same precedence the web app uses.

use crate::error::{ImportError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Deployment URL of the target document store
pub const ENV_DEPLOYMENT_URL: &str = "CONVEX_URL";

/// Fallback name used by the web app's client bundle
pub const ENV_DEPLOYMENT_URL_FALLBACK: &str = "NEXT_PUBLIC_CONVEX_URL";

pub const ENV_MUTATION_PATH: &str = "DOCPORT_MUTATION_PATH";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "DOCPORT_REQUEST_TIMEOUT_SECS";

/// Mutation that inserts one document into a named table
pub const DEFAULT_MUTATION_PATH: &str = "import:insertDocument";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Env files read from the data directory, highest precedence first
const ENV_FILES: &[&str] = &[".env.local", ".env"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Base URL of the deployment, without a trailing slash
    pub deployment_url: String,
    pub mutation_path: String,
    pub request_timeout: Duration,
    /// Directory scanned for `<table>.csv` / `<table>_rows.csv`
    pub data_dir: PathBuf,
}

impl ImportConfig {
    /// Load from the process environment
    pub fn from_env(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::from_lookup(data_dir, |name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn from_lookup<F>(data_dir: impl Into<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let deployment_url = value(ENV_DEPLOYMENT_URL)
            .or_else(|| value(ENV_DEPLOYMENT_URL_FALLBACK))
            .ok_or(ImportError::MissingDeploymentUrl {
                primary: ENV_DEPLOYMENT_URL,
                fallback: ENV_DEPLOYMENT_URL_FALLBACK,
            })?;

        if !deployment_url.starts_with("http://") && !deployment_url.starts_with("https://") {
            return Err(ImportError::config(format!(
                "deployment URL '{}' must start with http:// or https://",
                deployment_url
            )));
        }

        let request_timeout = match value(ENV_REQUEST_TIMEOUT_SECS) {
            Some(secs) => secs.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ImportError::config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_REQUEST_TIMEOUT_SECS, secs
                ))
            })?,
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            deployment_url: deployment_url.trim_end_matches('/').to_string(),
            mutation_path: value(ENV_MUTATION_PATH).unwrap_or_else(|| DEFAULT_MUTATION_PATH.to_string()),
            request_timeout,
            data_dir: data_dir.into(),
        })
    }
}

/// Load `.env.local` and `.env` from `dir` into the process environment.
///
/// Missing files are ignored; unreadable ones are logged and skipped.
pub fn load_env_files(dir: &Path) {
    for name in ENV_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => debug!(path = %path.display(), "Loaded environment file"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to load environment file"),
        }
    }
}
