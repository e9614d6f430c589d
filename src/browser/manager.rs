//! Run-scoped owner of the single automation browser
//!
//! The headless and headed tiers share one manager. Asking for the other
//! mode closes the running instance and launches a new one; pages opened
//! on the old instance are recognized as stale through the generation
//! counter.

use chromiumoxide::page::Page;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::setup::launch_with_proxy_fallback;
use super::wrapper::BrowserWrapper;
use crate::error::{HarvestError, HarvestResult};

#[derive(Default)]
struct ManagedBrowser {
    wrapper: Option<BrowserWrapper>,
    generation: u64,
}

/// Shared handle to the run's browser
#[derive(Clone, Default)]
pub struct BrowserManager {
    inner: Arc<Mutex<ManagedBrowser>>,
    proxy: Option<String>,
}

impl BrowserManager {
    /// Browser is launched lazily on the first page request
    #[must_use]
    pub fn new(proxy: Option<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManagedBrowser::default())),
            proxy,
        }
    }

    /// Open a blank page on a healthy browser in the requested mode
    ///
    /// Returns the page and the generation of the browser it belongs to.
    pub async fn new_page(&self, headless: bool) -> HarvestResult<(Page, u64)> {
        let mut guard = self.inner.lock().await;

        let reusable = match guard.wrapper.as_ref() {
            Some(wrapper) if wrapper.is_headless() != headless => {
                info!(headless, "Switching browser mode, relaunching");
                false
            }
            Some(wrapper) => match wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed, reusing existing browser");
                    true
                }
                Err(e) => {
                    warn!("Browser health check failed: {}. Relaunching", e);
                    false
                }
            },
            None => false,
        };

        if !reusable {
            if let Some(old) = guard.wrapper.take() {
                old.close().await;
            }
            let wrapper = launch_with_proxy_fallback(headless, self.proxy.as_deref()).await?;
            guard.wrapper = Some(wrapper);
            guard.generation += 1;
        }

        let generation = guard.generation;
        let wrapper = guard
            .wrapper
            .as_ref()
            .ok_or_else(|| HarvestError::BrowserLaunch("browser slot empty after launch".into()))?;
        let page = wrapper
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| HarvestError::BrowserLaunch(format!("Failed to open page: {e}")))?;

        Ok((page, generation))
    }

    /// Generation of the current browser; changes on every relaunch
    pub async fn generation(&self) -> u64 {
        self.inner.lock().await.generation
    }

    /// Close the browser if running; safe to call repeatedly
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if let Some(wrapper) = guard.wrapper.take() {
            info!("Shutting down browser");
            wrapper.close().await;
            guard.generation += 1;
        }
    }
}
