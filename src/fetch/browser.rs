//! Browser-backed tiers
//!
//! The strategy only knows the narrow [`PageRenderer`] capability: render
//! the site, then run the API call from inside the page. How the page is
//! rendered lives in `crate::browser`.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use url::Url;

use super::outcome::FetchOutcome;
use super::request::{ApiTarget, FetchRequest};
use super::strategy::{FetchStrategy, Readiness, StrategyAttempt, Tier};
use crate::error::{HarvestError, HarvestResult};
use crate::session::SessionState;
use crate::utils::{DEFAULT_RETRY_CEILING, DEFAULT_RETRY_DELAY_SECS};

/// Render-then-fetch capability of a browser context
#[async_trait]
pub trait PageRenderer: Send {
    /// Render the site home page with `session` applied, if not already open
    async fn open(&mut self, session: &SessionState) -> HarvestResult<()>;

    /// Fetch `url` from inside a rendered page that carries `session`
    ///
    /// The site is rendered on first use. `Err` means the browser itself
    /// is unusable; a failed in-page call is a `TransportError` outcome.
    async fn render_and_fetch(
        &mut self,
        url: &Url,
        session: &SessionState,
    ) -> HarvestResult<FetchOutcome>;

    /// Cookies and auth token currently held by the page
    async fn capture_session(&mut self) -> HarvestResult<SessionState>;

    /// Drop the page so the next call renders afresh
    async fn reset(&mut self) {}

    /// Release the browser context
    async fn close(&mut self) {}
}

/// Blocks until a human reports that the challenge is cleared
#[async_trait]
pub trait ChallengeGate: Send {
    async fn wait_for_confirmation(&mut self, prompt: &str) -> HarvestResult<()>;
}

/// Gate that prompts on stderr and waits for Enter on stdin
#[derive(Debug, Default)]
pub struct StdinGate;

#[async_trait]
impl ChallengeGate for StdinGate {
    async fn wait_for_confirmation(&mut self, prompt: &str) -> HarvestResult<()> {
        let mut stderr = tokio::io::stderr();
        stderr.write_all(prompt.as_bytes()).await?;
        stderr.write_all(b"\n").await?;
        stderr.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Err(HarvestError::AuthRequired(
                "stdin closed before the challenge was confirmed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fixed-interval polling after the user confirms
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

const CHALLENGE_PROMPT: &str = "A browser window is open on the IDX site. Clear any challenge or log in there, then press Enter to continue.";

/// Headless or headed browser tier
pub struct BrowserStrategy<R> {
    tier: Tier,
    renderer: R,
    target: ApiTarget,
    gate: Option<Box<dyn ChallengeGate>>,
    poll: PollPolicy,
    retry_ceiling: u32,
    retry_delay: Duration,
    ready: bool,
}

impl<R: PageRenderer> BrowserStrategy<R> {
    /// Headless tier: readiness is one probe request
    pub fn headless(renderer: R, target: ApiTarget) -> Self {
        Self {
            tier: Tier::BrowserHeadless,
            renderer,
            target,
            gate: None,
            poll: PollPolicy {
                attempts: 1,
                interval: Duration::ZERO,
            },
            retry_ceiling: DEFAULT_RETRY_CEILING,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            ready: false,
        }
    }

    /// Headed tier: readiness waits on `gate`, then polls the probe
    pub fn headed(
        renderer: R,
        target: ApiTarget,
        gate: Box<dyn ChallengeGate>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            tier: Tier::BrowserHeaded,
            renderer,
            target,
            gate: Some(gate),
            poll,
            retry_ceiling: DEFAULT_RETRY_CEILING,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            ready: false,
        }
    }

    /// Attempts per in-page call on transport failure, and the pause between
    #[must_use]
    pub fn with_transport_retry(mut self, ceiling: u32, delay: Duration) -> Self {
        self.retry_ceiling = ceiling.max(1);
        self.retry_delay = delay;
        self
    }

    /// Run one in-page call, retrying transport failures up to the ceiling
    ///
    /// The page is dropped after each transport failure so the next try
    /// renders afresh.
    async fn fetch_with_retry(
        &mut self,
        url: &Url,
        session: &SessionState,
    ) -> HarvestResult<FetchOutcome> {
        let attempts = self.retry_ceiling.max(1);
        let mut attempt = 1;
        loop {
            let outcome = self.renderer.render_and_fetch(url, session).await?;
            let FetchOutcome::TransportError { cause } = &outcome else {
                return Ok(outcome);
            };
            warn!(tier = %self.tier, attempt, attempts, "Transport failure: {}", cause);
            self.renderer.reset().await;
            if attempt >= attempts {
                return Ok(outcome);
            }
            attempt += 1;
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Poll the one-row probe; the last outcome is returned on failure
    async fn probe(
        &mut self,
        request: &FetchRequest,
        session: &SessionState,
    ) -> HarvestResult<Readiness> {
        let url = self.target.url_for(&request.probe());
        let attempts = self.poll.attempts.max(1);
        let mut attempt = 1;
        loop {
            let outcome = self.fetch_with_retry(&url, session).await?;
            debug!(tier = %self.tier, attempt, attempts, outcome = outcome.kind(), "Probe");
            if outcome.is_success() {
                return Ok(Readiness::Ready);
            }
            if attempt >= attempts {
                return Ok(Readiness::NotReady(outcome));
            }
            attempt += 1;
            tokio::time::sleep(self.poll.interval).await;
        }
    }
}

#[async_trait]
impl<R: PageRenderer> FetchStrategy for BrowserStrategy<R> {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn prepare(
        &mut self,
        request: &FetchRequest,
        session: &SessionState,
    ) -> HarvestResult<Readiness> {
        if self.ready {
            return Ok(Readiness::Ready);
        }

        if let Some(gate) = self.gate.as_mut() {
            // Window must be on screen before the prompt
            self.renderer.open(session).await?;
            info!("Waiting for challenge confirmation");
            gate.wait_for_confirmation(CHALLENGE_PROMPT).await?;
        }

        let readiness = self.probe(request, session).await?;
        self.ready = readiness.is_ready();
        match &readiness {
            Readiness::Ready => info!(tier = %self.tier, "Browser session verified by probe"),
            Readiness::NotReady(outcome) => warn!(tier = %self.tier, "Probe failed: {}", outcome),
        }
        Ok(readiness)
    }

    async fn attempt(
        &mut self,
        request: &FetchRequest,
        session: &SessionState,
    ) -> HarvestResult<StrategyAttempt> {
        let url = self.target.url_for(request);
        let outcome = self.fetch_with_retry(&url, session).await?;

        match &outcome {
            FetchOutcome::Success { .. } => {
                match self.renderer.capture_session().await {
                    Ok(captured) => Ok(StrategyAttempt::with_session(outcome, captured)),
                    Err(e) => {
                        warn!(tier = %self.tier, "Could not capture browser session: {}", e);
                        Ok(StrategyAttempt::new(outcome))
                    }
                }
            }
            FetchOutcome::TransportError { .. } => Ok(StrategyAttempt::new(outcome)),
            _ => {
                // Session stopped working; verify again before the next attempt
                self.ready = false;
                Ok(StrategyAttempt::new(outcome))
            }
        }
    }

    async fn shutdown(&mut self) {
        self.renderer.close().await;
    }
}
