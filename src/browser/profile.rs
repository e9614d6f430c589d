//! Throwaway Chrome profile directories
//!
//! Every launch gets its own UUID-named directory under the temp dir so a
//! headed relaunch never collides with the lock of the headless instance it
//! replaces.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Prefix of every profile directory this crate creates
pub const PROFILE_PREFIX: &str = "idx_scrape_chrome";

/// RAII guard for a profile directory
///
/// Removes the directory on drop unless ownership was passed on with
/// [`BrowserProfile::into_path`].
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the directory to another owner (the browser wrapper)
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            debug!("Removing unused profile {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to clean up profile directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Create a fresh, uniquely named profile directory
pub fn create_unique_profile() -> Result<BrowserProfile> {
    let path = std::env::temp_dir().join(format!("{}_{}", PROFILE_PREFIX, Uuid::new_v4()));

    // create_dir, not create_dir_all: an existing directory is an error
    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    debug!("Created Chrome profile directory {}", path.display());
    Ok(BrowserProfile {
        path,
        cleanup_on_drop: true,
    })
}
