//! Error types for harvesting runs
//!
//! Only failures that stop the whole run (or an explicit persistence call)
//! are represented here. Per-page failures such as a 403 or a challenge page
//! are ordinary data carried by `FetchOutcome` and never surface as `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for harvesting operations
pub type HarvestResult<T> = Result<T, HarvestError>;

/// Process exit code signalling that a fresh authenticated session is needed
pub const EXIT_AUTH_REQUIRED: i32 = 2;

/// Error types for harvesting operations
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Headless run has no usable session and interactive escalation is disallowed
    #[error("Authenticated session required: {0}")]
    AuthRequired(String),

    /// No Chrome/Chromium could be found or downloaded
    #[error("Browser engine unavailable: {0}")]
    BrowserUnavailable(String),

    /// Browser failed to launch, even after retrying without proxy
    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Reading or writing a session file failed
    #[error("Session file {path} could not be processed: {message}")]
    Persistence { path: PathBuf, message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// HTTP client construction or request failure outside page classification
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for HarvestError {
    fn from(error: anyhow::Error) -> Self {
        // {:#} keeps the context chain
        HarvestError::Other(format!("{error:#}"))
    }
}

impl HarvestError {
    /// Check if the error means the run cannot continue
    ///
    /// Persistence failures are the only non-fatal variant: losing the
    /// session file costs reuse on the next run, nothing more.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HarvestError::Persistence { .. })
    }

    /// Check if the caller should re-authenticate out of band
    #[must_use]
    pub fn is_auth_required(&self) -> bool {
        matches!(self, HarvestError::AuthRequired(_))
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_auth_required() {
            EXIT_AUTH_REQUIRED
        } else {
            1
        }
    }
}
