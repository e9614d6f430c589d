//! Record writers
//!
//! Both writers take the merged, sorted record list as-is; ordering is
//! decided upstream by the deduplicator.

pub mod csv;
pub mod json;

use std::path::Path;

use crate::error::{HarvestError, HarvestResult};

pub use self::csv::{save_csv, write_csv};
pub use self::json::{save_json, write_json};

/// Output format selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, `None` when unknown
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Create the parent directory of `path` if it has one
pub(crate) fn ensure_parent(path: &Path) -> HarvestResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::Persistence {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}
