//! Plain HTTP tiers: direct, alternate user agent, and session reuse
//!
//! All three share one implementation and differ only in the user agent and
//! whether the stored session is attached.

use std::time::{Duration, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use super::outcome::{FetchOutcome, classify_response};
use super::request::{ApiTarget, FetchRequest};
use super::strategy::{FetchStrategy, StrategyAttempt, Tier};
use crate::error::HarvestResult;
use crate::session::{SessionState, StoredCookie};
use crate::utils::constants::{
    ALT_USER_AGENT, API_ACCEPT, API_ACCEPT_LANGUAGE, PRIMARY_USER_AGENT, WARMUP_TIMEOUT_SECS,
};

/// Client settings shared by the HTTP tiers
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub proxy: Option<String>,
    pub request_timeout: Duration,
    pub retry_ceiling: u32,
    pub retry_delay: Duration,
    pub warm_up: bool,
}

impl HttpSettings {
    fn build_client(&self) -> HarvestResult<Client> {
        let mut builder = Client::builder().timeout(self.request_timeout);
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        Ok(builder.build()?)
    }
}

/// One plain-HTTP tier
pub struct HttpStrategy {
    tier: Tier,
    client: Client,
    target: ApiTarget,
    settings: HttpSettings,
    user_agent: &'static str,
    attach_session: bool,
}

impl HttpStrategy {
    /// Primary user agent, no stored session
    pub fn direct(target: ApiTarget, settings: HttpSettings) -> HarvestResult<Self> {
        Self::new(Tier::Direct, target, settings, PRIMARY_USER_AGENT, false)
    }

    /// Alternate user agent, no stored session
    pub fn alt_user_agent(target: ApiTarget, settings: HttpSettings) -> HarvestResult<Self> {
        Self::new(Tier::AltUserAgent, target, settings, ALT_USER_AGENT, false)
    }

    /// Primary user agent with stored cookies and bearer token attached
    pub fn session_reuse(target: ApiTarget, settings: HttpSettings) -> HarvestResult<Self> {
        Self::new(Tier::SessionReuse, target, settings, PRIMARY_USER_AGENT, true)
    }

    fn new(
        tier: Tier,
        target: ApiTarget,
        settings: HttpSettings,
        user_agent: &'static str,
        attach_session: bool,
    ) -> HarvestResult<Self> {
        let client = settings.build_client()?;
        Ok(Self {
            tier,
            client,
            target,
            settings,
            user_agent,
            attach_session,
        })
    }

    fn request_builder(&self, url: &Url, cookies: &SessionState) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .get(url.clone())
            .header("User-Agent", self.user_agent)
            .header("Accept", API_ACCEPT)
            .header("Accept-Language", API_ACCEPT_LANGUAGE)
            .header("Referer", self.target.home_url().as_str())
            .header("Origin", self.target.origin())
            .header("X-Requested-With", "XMLHttpRequest");

        if let Some(cookie) = cookies.cookie_header_for(url) {
            builder = builder.header("Cookie", cookie);
        }
        if self.attach_session
            && let Some(token) = cookies.local_auth_token()
        {
            builder = builder.header("Authorization", bearer(token));
        }
        builder
    }

    /// GET the home page to pick up cookies; failures are ignored
    async fn warm_up(&self, cookies: &SessionState) -> Vec<StoredCookie> {
        let url = self.target.home_url();
        let result = self
            .request_builder(url, cookies)
            .timeout(Duration::from_secs(WARMUP_TIMEOUT_SECS))
            .send()
            .await;
        match result {
            Ok(response) => {
                debug!(tier = %self.tier, status = response.status().as_u16(), "Warm-up finished");
                response_cookies(&response, url)
            }
            Err(e) => {
                debug!(tier = %self.tier, "Warm-up failed, continuing: {}", e);
                Vec::new()
            }
        }
    }

    /// Send the API call, retrying transport failures up to the ceiling
    async fn send_with_retry(
        &self,
        url: &Url,
        cookies: &SessionState,
    ) -> Result<(u16, String, Vec<StoredCookie>), String> {
        let attempts = self.settings.retry_ceiling.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let result = async {
                let response = self.request_builder(url, cookies).send().await?;
                let status = response.status().as_u16();
                let fresh = response_cookies(&response, url);
                let body = response.text().await?;
                Ok::<_, reqwest::Error>((status, body, fresh))
            }
            .await;

            match result {
                Ok(exchange) => return Ok(exchange),
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        tier = %self.tier,
                        attempt,
                        attempts,
                        "Transport failure: {}",
                        last_error
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.settings.retry_delay).await;
                    }
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl FetchStrategy for HttpStrategy {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn attempt(
        &mut self,
        request: &FetchRequest,
        session: &SessionState,
    ) -> HarvestResult<StrategyAttempt> {
        let mut working = if self.attach_session {
            session.clone()
        } else {
            SessionState::empty()
        };
        let mut fresh = Vec::new();

        if self.settings.warm_up {
            let warm = self.warm_up(&working).await;
            if !warm.is_empty() {
                working = working.with_merged_cookies(warm.clone());
                fresh.extend(warm);
            }
        }

        let url = self.target.url_for(request);
        let (status, body, api_cookies) = match self.send_with_retry(&url, &working).await {
            Ok(exchange) => exchange,
            Err(cause) => {
                return Ok(StrategyAttempt::new(FetchOutcome::TransportError { cause }));
            }
        };
        fresh.extend(api_cookies);

        let outcome = classify_response(status, &body);
        if outcome.is_success() {
            Ok(StrategyAttempt::with_session(
                outcome,
                session.with_merged_cookies(fresh),
            ))
        } else {
            Ok(StrategyAttempt::new(outcome))
        }
    }
}

/// `Authorization` value for a stored token, which may already carry its scheme
fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

/// Cookies set by `response`, scoped to the request host when no domain is given
fn response_cookies(response: &Response, url: &Url) -> Vec<StoredCookie> {
    let host = url.host_str().unwrap_or_default();
    response
        .cookies()
        .map(|c| {
            let mut cookie = StoredCookie::new(
                c.name(),
                c.value(),
                c.domain().unwrap_or(host),
                c.path().unwrap_or("/"),
            );
            cookie.http_only = c.http_only();
            cookie.secure = c.secure();
            if let Some(expires) = c.expires() {
                cookie.expires = expires
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64();
            }
            cookie
        })
        .collect()
}
