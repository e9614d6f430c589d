//! Default locations for persisted session files.
//!
//! Session files live under the user configuration directory so that cron
//! and CI runs on the same account pick up what an interactive run captured.

use std::path::PathBuf;
use tracing::warn;

use super::constants::{CONFIG_DIR_NAME, COOKIE_EXPORT_FILE, STORAGE_STATE_FILE};

/// Directory holding the storage state and cookie export
///
/// Resolves to `$XDG_CONFIG_HOME/idx-scraper` (or the platform equivalent).
/// Falls back to the temp directory when no config directory can be
/// determined, which only costs session reuse across reboots.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(base) => base.join(CONFIG_DIR_NAME),
        None => {
            let fallback = std::env::temp_dir().join(CONFIG_DIR_NAME);
            warn!(
                "Could not determine user config directory, using temp directory fallback: {}",
                fallback.display()
            );
            fallback
        }
    }
}

/// Default path of the persisted storage state
#[must_use]
pub fn default_storage_state_path() -> PathBuf {
    default_config_dir().join(STORAGE_STATE_FILE)
}

/// Default path of the reduced cookie export
#[must_use]
pub fn default_cookie_export_path() -> PathBuf {
    default_config_dir().join(COOKIE_EXPORT_FILE)
}
