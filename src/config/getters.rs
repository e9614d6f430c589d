//! Getter methods for `HarvestConfig`

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::HarvestConfig;
use crate::error::HarvestResult;
use crate::fetch::{ApiTarget, HttpSettings, PollPolicy};
use crate::session::SessionStore;

impl HarvestConfig {
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn home_url(&self) -> &str {
        &self.home_url
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    #[must_use]
    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    #[must_use]
    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    #[must_use]
    pub fn emiten_type(&self) -> &str {
        &self.emiten_type
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    #[must_use]
    pub fn storage_state_path(&self) -> &Path {
        &self.storage_state_path
    }

    #[must_use]
    pub fn cookie_export_path(&self) -> Option<&PathBuf> {
        self.cookie_export_path.as_ref()
    }

    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    #[must_use]
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    #[must_use]
    pub fn allow_interactive(&self) -> bool {
        self.allow_interactive
    }

    #[must_use]
    pub fn client_filter(&self) -> bool {
        self.client_filter
    }

    #[must_use]
    pub fn remember_proven_strategy(&self) -> bool {
        self.remember_proven_strategy
    }

    #[must_use]
    pub fn warm_up(&self) -> bool {
        self.warm_up
    }

    #[must_use]
    pub fn retry_ceiling(&self) -> u32 {
        self.retry_ceiling
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    #[must_use]
    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// API endpoint and fixed query parameters
    pub fn api_target(&self) -> HarvestResult<ApiTarget> {
        ApiTarget::new(&self.api_url, &self.home_url, &self.emiten_type, &self.lang)
    }

    /// Client settings for the HTTP tiers
    #[must_use]
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            proxy: self.proxy_url.clone(),
            request_timeout: self.request_timeout(),
            retry_ceiling: self.retry_ceiling,
            retry_delay: self.retry_delay(),
            warm_up: self.warm_up,
        }
    }

    /// Polling used by the headed tier after confirmation
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            attempts: self.poll_attempts,
            interval: self.poll_interval(),
        }
    }

    /// Session files for this run
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(
            self.storage_state_path.clone(),
            self.cookie_export_path.clone(),
        )
    }
}
