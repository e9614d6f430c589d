//! Chromium plumbing behind the browser tiers
//!
//! One browser per run, owned by [`BrowserManager`] and closed at the end
//! of the run whatever the outcome.

pub mod manager;
pub mod profile;
pub mod renderer;
pub mod setup;
pub mod stealth;
pub mod timeout;
pub mod wrapper;

pub use manager::BrowserManager;
pub use profile::{BrowserProfile, create_unique_profile};
pub use renderer::ChromiumRenderer;
pub use setup::{
    download_managed_browser, find_browser_executable, launch_browser, launch_with_proxy_fallback,
};
pub use timeout::with_page_timeout;
pub use wrapper::BrowserWrapper;
