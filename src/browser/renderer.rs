//! Chromium implementation of the render-then-fetch capability

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::manager::BrowserManager;
use super::stealth;
use super::timeout::with_page_timeout;
use crate::error::{HarvestError, HarvestResult};
use crate::fetch::{FetchOutcome, PageRenderer, classify_response};
use crate::session::{SessionState, StoredCookie};
use crate::utils::constants::{API_ACCEPT, AUTH_MARKER, NETWORK_SETTLE_TIMEOUT_SECS};
use crate::utils::string_utils::excerpt;

/// What the in-page fetch script hands back
#[derive(Debug, Deserialize)]
struct InPageResponse {
    ok: bool,
    status: u16,
    body: String,
}

/// Renders the site in Chromium and calls the API from the page
pub struct ChromiumRenderer {
    manager: BrowserManager,
    headless: bool,
    home_url: Url,
    navigation_timeout: Duration,
    page: Option<(Page, u64)>,
}

impl ChromiumRenderer {
    pub fn new(
        manager: BrowserManager,
        headless: bool,
        home_url: Url,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            manager,
            headless,
            home_url,
            navigation_timeout,
            page: None,
        }
    }

    /// Page on the current browser generation, opening one if needed
    async fn live_page(&mut self, session: &SessionState) -> HarvestResult<Page> {
        let current = self.manager.generation().await;
        if let Some((page, generation)) = &self.page
            && *generation == current
        {
            return Ok(page.clone());
        }

        let (page, generation) = self.manager.new_page(self.headless).await?;
        self.prime_page(&page, session).await;
        self.page = Some((page.clone(), generation));
        Ok(page)
    }

    /// Stealth, cookies, home navigation and token; each step best-effort
    async fn prime_page(&self, page: &Page, session: &SessionState) {
        if let Err(e) = stealth::inject(page).await {
            warn!("Stealth injection failed: {}", e);
        }

        let cookies = cookie_params(session, &self.home_url);
        if !cookies.is_empty() {
            let count = cookies.len();
            match page.set_cookies(cookies).await {
                Ok(_) => debug!("Applied {} session cookies to browser", count),
                Err(e) => warn!("Failed to apply session cookies: {}", e),
            }
        }

        info!(headless = self.headless, "Rendering {}", self.home_url);
        // Subscribe first so the idle event of this navigation is not missed
        let lifecycle = match page.event_listener::<EventLifecycleEvent>().await {
            Ok(stream) => Some(stream),
            Err(e) => {
                debug!("Lifecycle events unavailable: {}", e);
                None
            }
        };

        let navigation = async {
            page.goto(self.home_url.as_str())
                .await
                .context("Failed to navigate to home page")?;
            Ok(())
        };
        if let Err(e) = with_page_timeout(navigation, self.navigation_timeout, "Home navigation").await {
            // A challenge page may never load; the in-page call decides
            warn!("{:#}", e);
        }

        if let Some(mut lifecycle) = lifecycle {
            let settle = async {
                while let Some(event) = lifecycle.next().await {
                    if event.name == "networkIdle" {
                        return Ok(());
                    }
                }
                Err(anyhow::anyhow!("lifecycle stream ended before network idle"))
            };
            let limit = Duration::from_secs(NETWORK_SETTLE_TIMEOUT_SECS);
            match with_page_timeout(settle, limit, "Network settle").await {
                Ok(()) => debug!("Home page network settled"),
                Err(e) => debug!("{:#}", e),
            }
        }

        if let Some(token) = session.local_auth_token() {
            let script = format!(
                "localStorage.setItem({}, {})",
                js_string(AUTH_MARKER),
                js_string(token)
            );
            if let Err(e) = page.evaluate(script).await {
                warn!("Failed to seed auth token into localStorage: {}", e);
            }
        }
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(
        page: &Page,
        expression: String,
        timeout: Duration,
    ) -> anyhow::Result<T> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid evaluate params: {e}"))?;
        let evaluation = async {
            let result = page
                .evaluate_expression(params)
                .await
                .context("In-page evaluation failed")?;
            result
                .into_value::<T>()
                .context("Unexpected in-page evaluation result")
        };
        with_page_timeout(evaluation, timeout, "In-page evaluation").await
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn open(&mut self, session: &SessionState) -> HarvestResult<()> {
        self.live_page(session).await.map(|_| ())
    }

    async fn render_and_fetch(
        &mut self,
        url: &Url,
        session: &SessionState,
    ) -> HarvestResult<FetchOutcome> {
        let page = self.live_page(session).await?;
        let script = fetch_script(url);

        match Self::evaluate::<InPageResponse>(&page, script, self.navigation_timeout).await {
            Ok(response) if response.ok => Ok(classify_response(response.status, &response.body)),
            Ok(response) => Ok(FetchOutcome::TransportError {
                cause: excerpt(&response.body),
            }),
            Err(e) => {
                self.reset().await;
                Ok(FetchOutcome::TransportError {
                    cause: format!("{e:#}"),
                })
            }
        }
    }

    async fn capture_session(&mut self) -> HarvestResult<SessionState> {
        let Some((page, _)) = &self.page else {
            return Ok(SessionState::empty());
        };
        let page = page.clone();

        let cookies = page
            .get_cookies()
            .await
            .map_err(|e| HarvestError::Other(format!("Failed to read browser cookies: {e}")))?;
        let token: Option<String> = Self::evaluate(
            &page,
            format!("localStorage.getItem({})", js_string(AUTH_MARKER)),
            self.navigation_timeout,
        )
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to read auth token from localStorage: {:#}", e);
            None
        });

        let cookies: Vec<StoredCookie> = cookies.into_iter().map(stored_cookie).collect();
        debug!(cookies = cookies.len(), token = token.is_some(), "Captured browser session");
        Ok(SessionState::new(cookies, token))
    }

    async fn reset(&mut self) {
        if let Some((page, _)) = self.page.take()
            && let Err(e) = page.close().await
        {
            debug!("Failed to close page: {}", e);
        }
    }

    async fn close(&mut self) {
        self.reset().await;
        self.manager.shutdown().await;
    }
}

/// JSON-encode a string so it can be spliced into a script as a literal
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Script that fetches `url` with page credentials and reports status and body
fn fetch_script(url: &Url) -> String {
    format!(
        r#"(async () => {{
    try {{
        const headers = {{ 'Accept': {accept}, 'X-Requested-With': 'XMLHttpRequest' }};
        const token = localStorage.getItem({marker});
        if (token && token !== 'false') {{
            headers['Authorization'] = token.startsWith('Bearer ') ? token : 'Bearer ' + token;
        }}
        const response = await fetch({url}, {{ credentials: 'include', headers }});
        return {{ ok: true, status: response.status, body: await response.text() }};
    }} catch (e) {{
        return {{ ok: false, status: 0, body: String(e) }};
    }}
}})()"#,
        accept = js_string(API_ACCEPT),
        marker = js_string(AUTH_MARKER),
        url = js_string(url.as_str()),
    )
}

fn cookie_params(session: &SessionState, home_url: &Url) -> Vec<CookieParam> {
    session
        .cookies()
        .iter()
        .filter_map(|c| {
            let mut builder = CookieParam::builder()
                .name(c.name.clone())
                .value(c.value.clone())
                .path(c.path.clone())
                .secure(c.secure)
                .http_only(c.http_only);
            builder = if c.domain.is_empty() {
                builder.url(home_url.as_str())
            } else {
                builder.domain(c.domain.clone())
            };
            if let Some(same_site) = c.same_site.as_deref().and_then(|s| s.parse::<CookieSameSite>().ok()) {
                builder = builder.same_site(same_site);
            }
            // -1 marks a session cookie
            if c.expires > 0.0 {
                builder = builder.expires(TimeSinceEpoch::new(c.expires));
            }
            match builder.build() {
                Ok(param) => Some(param),
                Err(e) => {
                    warn!("Skipping cookie {}: {}", c.name, e);
                    None
                }
            }
        })
        .collect()
}

fn stored_cookie(cookie: Cookie) -> StoredCookie {
    let mut stored = StoredCookie::new(cookie.name, cookie.value, cookie.domain, cookie.path);
    stored.expires = cookie.expires;
    stored.http_only = cookie.http_only;
    stored.secure = cookie.secure;
    stored.same_site = cookie.same_site.map(|s| s.as_ref().to_string());
    stored
}
