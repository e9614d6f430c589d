use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::transition::{Transition, after_refusal};
use crate::error::{HarvestError, HarvestResult};
use crate::fetch::{FetchOutcome, FetchRequest, FetchStrategy, Readiness, Tier};
use crate::paginator::{PageFetch, PageSource};
use crate::session::{SessionState, SessionStore};

/// Escalation switches chosen by the caller
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// Allow the headed tier, which needs a human at the keyboard
    pub allow_interactive: bool,
    /// Start later pages at the last tier that succeeded
    pub remember_proven: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            allow_interactive: false,
            remember_proven: true,
        }
    }
}

/// Tries tiers cheapest-first for each page and owns the run's session
pub struct FallbackOrchestrator {
    strategies: BTreeMap<Tier, Box<dyn FetchStrategy>>,
    session: SessionState,
    store: Option<SessionStore>,
    options: OrchestratorOptions,
    proven: Option<Tier>,
    last_tier: Option<Tier>,
    /// A human cleared the challenge in the headed browser
    headed_cleared: bool,
}

impl FallbackOrchestrator {
    pub fn new(
        session: SessionState,
        store: Option<SessionStore>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            strategies: BTreeMap::new(),
            session,
            store,
            options,
            proven: None,
            last_tier: None,
            headed_cleared: false,
        }
    }

    /// Register the strategy for its tier, replacing any previous one
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn FetchStrategy>) -> Self {
        self.strategies.insert(strategy.tier(), strategy);
        self
    }

    /// Current session snapshot
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Tier later pages will start at, if one has succeeded
    #[must_use]
    pub fn proven_tier(&self) -> Option<Tier> {
        self.proven
    }

    /// Tier that served the most recent successful page
    #[must_use]
    pub fn last_tier(&self) -> Option<Tier> {
        self.last_tier
    }

    fn starting_tier(&self) -> Tier {
        if self.options.remember_proven {
            self.proven.unwrap_or(Tier::Direct)
        } else {
            Tier::Direct
        }
    }

    fn adopt_session(&mut self, fresh: SessionState) {
        if fresh.same_contents(&self.session) {
            return;
        }
        debug!(
            cookies = fresh.cookies().len(),
            auth = fresh.has_auth_signal(),
            "Session updated"
        );
        self.session = fresh;
        if let Some(store) = &self.store {
            store.save_best_effort(&self.session);
        }
    }

    /// Headless is passed over while the headed browser holds a cleared
    /// challenge; both tiers share one browser.
    fn skips(&self, tier: Tier) -> bool {
        tier == Tier::BrowserHeadless
            && self.headed_cleared
            && self.options.allow_interactive
            && self.strategies.contains_key(&Tier::BrowserHeaded)
    }

    /// Prepare then attempt `tier`
    ///
    /// `None` when no strategy is registered. The flag is true when the
    /// outcome came from the page attempt rather than the readiness check.
    async fn run_tier(
        &mut self,
        tier: Tier,
        request: &FetchRequest,
    ) -> HarvestResult<Option<(FetchOutcome, bool)>> {
        let Some(strategy) = self.strategies.get_mut(&tier) else {
            return Ok(None);
        };
        info!(
            keyword = request.keyword(),
            offset = request.page_offset(),
            %tier,
            "Attempting page"
        );
        if let Readiness::NotReady(outcome) = strategy.prepare(request, &self.session).await? {
            return Ok(Some((outcome, false)));
        }
        let attempt = strategy.attempt(request, &self.session).await?;
        if let Some(fresh) = attempt.session.filter(|_| attempt.outcome.is_success()) {
            self.adopt_session(fresh);
        }
        Ok(Some((attempt.outcome, true)))
    }

    /// Re-check a headless tier whose probe passed but whose page was refused
    ///
    /// `Some(reason)` when the probe still passes or cannot be reached, so
    /// only the page fails. `None` when the probe is refused too.
    async fn reverify(&mut self, tier: Tier, request: &FetchRequest) -> HarvestResult<Option<String>> {
        let Some(strategy) = self.strategies.get_mut(&tier) else {
            return Ok(None);
        };
        match strategy.prepare(request, &self.session).await? {
            Readiness::Ready => Ok(Some(format!(
                "{tier}: page refused although the probe still passes"
            ))),
            Readiness::NotReady(FetchOutcome::TransportError { cause }) => {
                Ok(Some(format!("{tier}: {cause}")))
            }
            Readiness::NotReady(outcome) => {
                warn!(%tier, "Probe refused again: {}", outcome);
                Ok(None)
            }
        }
    }

    /// Fetch one page, escalating on refusal
    ///
    /// `Err` only for run-ending failures: `AuthRequired`, or a browser that
    /// cannot be found or launched.
    pub async fn fetch(&mut self, request: &FetchRequest) -> HarvestResult<PageFetch> {
        let mut tier = self.starting_tier();

        loop {
            if self.skips(tier) {
                debug!(%tier, "Headed browser already cleared, skipping headless");
                tier = Tier::BrowserHeaded;
                continue;
            }

            match self.run_tier(tier, request).await? {
                Some((
                    FetchOutcome::Success {
                        replies,
                        total_count,
                    },
                    _,
                )) => {
                    if self.proven != Some(tier) {
                        info!(%tier, "Tier proven, later pages start here");
                    }
                    self.proven = Some(tier);
                    self.last_tier = Some(tier);
                    if tier == Tier::BrowserHeaded {
                        self.headed_cleared = true;
                    }
                    return Ok(PageFetch::Fetched {
                        replies,
                        total_count,
                        tier,
                    });
                }
                Some((FetchOutcome::TransportError { cause }, _)) => {
                    warn!(%tier, keyword = request.keyword(), "Transport failure, page skipped: {}", cause);
                    return Ok(PageFetch::Failed {
                        reason: format!("{tier}: {cause}"),
                    });
                }
                Some((refusal, attempted)) => {
                    warn!(%tier, keyword = request.keyword(), "Refused: {}", refusal);
                    if attempted
                        && tier == Tier::BrowserHeadless
                        && let Some(reason) = self.reverify(tier, request).await?
                    {
                        warn!(%tier, keyword = request.keyword(), "Page skipped: {}", reason);
                        return Ok(PageFetch::Failed { reason });
                    }
                }
                None => {
                    debug!(%tier, "No strategy configured for tier, skipping");
                }
            }

            if self.proven == Some(tier) {
                self.proven = None;
            }
            if tier == Tier::BrowserHeaded {
                self.headed_cleared = false;
            }

            match after_refusal(
                tier,
                self.session.has_auth_signal(),
                self.options.allow_interactive,
            ) {
                Transition::Escalate(next) => {
                    info!(from = %tier, to = %next, "Escalating");
                    tier = next;
                }
                Transition::PageFailed(reason) => {
                    return Ok(PageFetch::Failed { reason });
                }
                Transition::AuthRequired(reason) => {
                    return Err(HarvestError::AuthRequired(reason));
                }
            }
        }
    }

    /// Release every strategy's resources
    pub async fn shutdown(&mut self) {
        for strategy in self.strategies.values_mut() {
            strategy.shutdown().await;
        }
    }
}

#[async_trait]
impl PageSource for FallbackOrchestrator {
    async fn fetch_page(&mut self, request: &FetchRequest) -> HarvestResult<PageFetch> {
        self.fetch(request).await
    }
}
