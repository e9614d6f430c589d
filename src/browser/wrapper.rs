use chromiumoxide::browser::Browser;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Browser plus its CDP handler task and profile directory
///
/// The handler is aborted on drop. Dropping does not close the Chrome
/// process gracefully; call [`BrowserWrapper::close`] for that.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
    headless: bool,
}

impl BrowserWrapper {
    pub(crate) fn new(
        browser: Browser,
        handler: JoinHandle<()>,
        user_data_dir: PathBuf,
        headless: bool,
    ) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
            headless,
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Whether this instance runs without a window
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Close the browser, wait for the process, then remove the profile
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.cleanup_temp_dir();
    }

    /// Remove the profile directory; only safe once Chrome has exited
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up browser profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up profile {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without close(), removing profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}
