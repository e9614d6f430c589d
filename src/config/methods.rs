//! Builder methods available for all states

use std::path::PathBuf;

use super::builder::HarvestConfigBuilder;

impl<State> HarvestConfigBuilder<State> {
    /// Replace the keyword list (the default is the corporate-action set)
    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Point the run at another API endpoint (tests use a local mock)
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Home page used for warm-up, `Referer`, `Origin` and browser rendering
    #[must_use]
    pub fn home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    #[must_use]
    pub fn emiten_type(mut self, emiten_type: impl Into<String>) -> Self {
        self.emiten_type = emiten_type.into();
        self
    }

    #[must_use]
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Ceiling on pages fetched per keyword
    #[must_use]
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn storage_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_state_path = path.into();
        self
    }

    /// Where to write the cookie-only export; `None` disables it
    #[must_use]
    pub fn cookie_export_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_export_path = path;
        self
    }

    /// Raw `Cookie:` header (`a=1; b=2`) merged into the loaded session
    #[must_use]
    pub fn cookie_header(mut self, header: Option<String>) -> Self {
        self.cookie_header = header;
        self
    }

    /// Bearer token sent by session reuse and seeded into browser storage
    #[must_use]
    pub fn auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    /// Proxy URL; a bare `host:port` gets an `http://` scheme
    #[must_use]
    pub fn proxy_url(mut self, proxy: Option<String>) -> Self {
        self.proxy_url = proxy;
        self
    }

    /// Allow escalation to a visible browser that waits for a human
    #[must_use]
    pub fn allow_interactive(mut self, allow: bool) -> Self {
        self.allow_interactive = allow;
        self
    }

    /// Re-check replies with the keyword matcher when merging (default on)
    #[must_use]
    pub fn client_filter(mut self, enabled: bool) -> Self {
        self.client_filter = enabled;
        self
    }

    /// Start later pages at the last successful tier (default on)
    ///
    /// Turning this off walks the full chain from `Direct` for every page.
    #[must_use]
    pub fn remember_proven_strategy(mut self, remember: bool) -> Self {
        self.remember_proven_strategy = remember;
        self
    }

    #[must_use]
    pub fn warm_up(mut self, warm_up: bool) -> Self {
        self.warm_up = warm_up;
        self
    }

    /// Attempts per HTTP tier on transport failure (minimum 1)
    #[must_use]
    pub fn retry_ceiling(mut self, ceiling: u32) -> Self {
        self.retry_ceiling = ceiling;
        self
    }

    #[must_use]
    pub fn retry_delay_secs(mut self, secs: u64) -> Self {
        self.retry_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }

    #[must_use]
    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn navigation_timeout_secs(mut self, secs: u64) -> Self {
        self.navigation_timeout_secs = secs;
        self
    }
}
