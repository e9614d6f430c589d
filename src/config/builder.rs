//! Type-safe builder for `HarvestConfig` using the typestate pattern
//!
//! `build()` only exists once a date window is set, either explicitly or
//! through [`HarvestConfigBuilder::default_window`].

use chrono::{Duration, Local, NaiveDate};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::HarvestConfig;
use crate::error::{HarvestError, HarvestResult};
use crate::utils::{
    DEFAULT_EMITEN_TYPE, DEFAULT_KEYWORDS, DEFAULT_LANG, DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_PAGES,
    DEFAULT_NAVIGATION_TIMEOUT_SECS, DEFAULT_PAGE_SIZE, DEFAULT_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_CEILING,
    DEFAULT_RETRY_DELAY_SECS, IDX_API_URL, IDX_HOME_URL, default_cookie_export_path,
    default_storage_state_path,
};

// Type states for the builder
pub struct WithDateWindow;

pub struct HarvestConfigBuilder<State = ()> {
    pub(crate) api_url: String,
    pub(crate) home_url: String,
    pub(crate) keywords: Vec<String>,
    pub(crate) date_from: Option<NaiveDate>,
    pub(crate) date_to: Option<NaiveDate>,
    pub(crate) emiten_type: String,
    pub(crate) lang: String,
    pub(crate) page_size: u32,
    pub(crate) max_pages: u32,
    pub(crate) storage_state_path: PathBuf,
    pub(crate) cookie_export_path: Option<PathBuf>,
    pub(crate) cookie_header: Option<String>,
    pub(crate) auth_token: Option<String>,
    pub(crate) proxy_url: Option<String>,
    pub(crate) allow_interactive: bool,
    pub(crate) client_filter: bool,
    pub(crate) remember_proven_strategy: bool,
    pub(crate) warm_up: bool,
    pub(crate) retry_ceiling: u32,
    pub(crate) retry_delay_secs: u64,
    pub(crate) poll_attempts: u32,
    pub(crate) poll_interval_secs: u64,
    pub(crate) request_timeout_secs: u64,
    pub(crate) navigation_timeout_secs: u64,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for HarvestConfigBuilder<()> {
    fn default() -> Self {
        Self {
            api_url: IDX_API_URL.to_string(),
            home_url: IDX_HOME_URL.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()).collect(),
            date_from: None,
            date_to: None,
            emiten_type: DEFAULT_EMITEN_TYPE.to_string(),
            lang: DEFAULT_LANG.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            storage_state_path: default_storage_state_path(),
            cookie_export_path: Some(default_cookie_export_path()),
            cookie_header: None,
            auth_token: None,
            proxy_url: None,
            allow_interactive: false,
            client_filter: true,
            remember_proven_strategy: true,
            warm_up: true,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            navigation_timeout_secs: DEFAULT_NAVIGATION_TIMEOUT_SECS,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfig {
    /// Create a builder for configuring a `HarvestConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder<()> {
        HarvestConfigBuilder::default()
    }
}

/// Window ending `today` and starting the default look-back before it
#[must_use]
pub fn default_date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(DEFAULT_LOOKBACK_DAYS), today)
}

/// Prefix a bare `host:port` proxy with `http://`; blank means no proxy
#[must_use]
pub fn normalize_proxy(proxy: &str) -> Option<String> {
    let trimmed = proxy.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.contains("://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("http://{trimmed}"))
    }
}

impl HarvestConfigBuilder<()> {
    /// Set the inclusive date window
    pub fn date_window(
        self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> HarvestConfigBuilder<WithDateWindow> {
        HarvestConfigBuilder {
            api_url: self.api_url,
            home_url: self.home_url,
            keywords: self.keywords,
            date_from: Some(date_from),
            date_to: Some(date_to),
            emiten_type: self.emiten_type,
            lang: self.lang,
            page_size: self.page_size,
            max_pages: self.max_pages,
            storage_state_path: self.storage_state_path,
            cookie_export_path: self.cookie_export_path,
            cookie_header: self.cookie_header,
            auth_token: self.auth_token,
            proxy_url: self.proxy_url,
            allow_interactive: self.allow_interactive,
            client_filter: self.client_filter,
            remember_proven_strategy: self.remember_proven_strategy,
            warm_up: self.warm_up,
            retry_ceiling: self.retry_ceiling,
            retry_delay_secs: self.retry_delay_secs,
            poll_attempts: self.poll_attempts,
            poll_interval_secs: self.poll_interval_secs,
            request_timeout_secs: self.request_timeout_secs,
            navigation_timeout_secs: self.navigation_timeout_secs,
            _phantom: PhantomData,
        }
    }

    /// Use the default window: the last two days up to today (local time)
    pub fn default_window(self) -> HarvestConfigBuilder<WithDateWindow> {
        let (from, to) = default_date_window(Local::now().date_naive());
        self.date_window(from, to)
    }
}

// Build method only available when the date window is set
impl HarvestConfigBuilder<WithDateWindow> {
    pub fn build(self) -> HarvestResult<HarvestConfig> {
        let date_from = self
            .date_from
            .ok_or_else(|| HarvestError::Config("date_from is required".into()))?;
        let date_to = self
            .date_to
            .ok_or_else(|| HarvestError::Config("date_to is required".into()))?;

        if date_from > date_to {
            return Err(HarvestError::Config(format!(
                "date window is reversed: {date_from} is after {date_to}"
            )));
        }
        if self.page_size == 0 {
            return Err(HarvestError::Config("page_size must be greater than 0".into()));
        }
        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be greater than 0".into()));
        }

        let keywords: Vec<String> = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(HarvestError::Config("at least one keyword is required".into()));
        }

        for (name, value) in [("api_url", &self.api_url), ("home_url", &self.home_url)] {
            url::Url::parse(value)
                .map_err(|e| HarvestError::Config(format!("invalid {name} '{value}': {e}")))?;
        }

        Ok(HarvestConfig {
            api_url: self.api_url,
            home_url: self.home_url,
            keywords,
            date_from,
            date_to,
            emiten_type: self.emiten_type,
            lang: self.lang,
            page_size: self.page_size,
            max_pages: self.max_pages,
            storage_state_path: self.storage_state_path,
            cookie_export_path: self.cookie_export_path,
            cookie_header: self.cookie_header.filter(|h| !h.trim().is_empty()),
            auth_token: self.auth_token.filter(|t| !t.trim().is_empty()),
            proxy_url: self.proxy_url.as_deref().and_then(normalize_proxy),
            allow_interactive: self.allow_interactive,
            client_filter: self.client_filter,
            remember_proven_strategy: self.remember_proven_strategy,
            warm_up: self.warm_up,
            retry_ceiling: self.retry_ceiling.max(1),
            retry_delay_secs: self.retry_delay_secs,
            poll_attempts: self.poll_attempts.max(1),
            poll_interval_secs: self.poll_interval_secs,
            request_timeout_secs: self.request_timeout_secs,
            navigation_timeout_secs: self.navigation_timeout_secs,
        })
    }
}
