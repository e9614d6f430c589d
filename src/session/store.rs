//! Session persistence
//!
//! Loading never fails: a missing or malformed file is an empty session.
//! Saving reports `HarvestError::Persistence`, which callers log and move
//! past; losing the file only costs reuse on the next run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::state::{SessionState, StorageStateFile};
use crate::error::{HarvestError, HarvestResult};

/// Load a storage state file into a session
///
/// Returns an empty session when the file is missing or unreadable.
#[must_use]
pub fn load(path: &Path) -> SessionState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No session file at {}, starting empty", path.display());
            return SessionState::empty();
        }
        Err(e) => {
            warn!("Could not read session file {}: {}", path.display(), e);
            return SessionState::empty();
        }
    };

    match serde_json::from_str::<StorageStateFile>(&raw) {
        Ok(file) => {
            let state = SessionState::from_storage_file(file);
            info!(
                "Loaded session from {} ({} cookies, auth signal: {})",
                path.display(),
                state.cookies().len(),
                state.has_auth_signal()
            );
            state
        }
        Err(e) => {
            warn!(
                "Session file {} is malformed, starting empty: {}",
                path.display(),
                e
            );
            SessionState::empty()
        }
    }
}

/// Write `state` to `path` as a storage state file
pub fn save(state: &SessionState, path: &Path) -> HarvestResult<()> {
    write_json(path, &state.to_storage_file())
}

/// True if `state` carries the site's auth marker
#[must_use]
pub fn has_auth_signal(state: &SessionState) -> bool {
    state.has_auth_signal()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> HarvestResult<()> {
    let persistence = |message: String| HarvestError::Persistence {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
    }

    let json = serde_json::to_string_pretty(value).map_err(|e| persistence(e.to_string()))?;

    // Write next to the target and rename so a crash never leaves half a file
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| persistence(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| persistence(e.to_string()))?;
    Ok(())
}

/// Storage state file plus its optional cookie-only export
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage_path: PathBuf,
    cookie_export_path: Option<PathBuf>,
}

impl SessionStore {
    pub fn new(storage_path: impl Into<PathBuf>, cookie_export_path: Option<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
            cookie_export_path,
        }
    }

    #[must_use]
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    #[must_use]
    pub fn cookie_export_path(&self) -> Option<&Path> {
        self.cookie_export_path.as_deref()
    }

    #[must_use]
    pub fn load(&self) -> SessionState {
        load(&self.storage_path)
    }

    /// Save the storage state and refresh the cookie export
    pub fn save(&self, state: &SessionState) -> HarvestResult<()> {
        save(state, &self.storage_path)?;
        if let Some(export) = &self.cookie_export_path {
            write_json(export, &state.to_cookie_export())?;
        }
        debug!("Session saved to {}", self.storage_path.display());
        Ok(())
    }

    /// Save, logging a failure instead of returning it
    pub fn save_best_effort(&self, state: &SessionState) {
        if let Err(e) = self.save(state) {
            warn!("{}", e);
        }
    }
}
