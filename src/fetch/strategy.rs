//! The capability every retrieval tier provides

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::outcome::FetchOutcome;
use super::request::FetchRequest;
use crate::error::HarvestResult;
use crate::session::SessionState;

/// Retrieval tiers, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Direct,
    AltUserAgent,
    SessionReuse,
    BrowserHeadless,
    BrowserHeaded,
}

impl Tier {
    /// All tiers in escalation order
    pub const ALL: [Tier; 5] = [
        Tier::Direct,
        Tier::AltUserAgent,
        Tier::SessionReuse,
        Tier::BrowserHeadless,
        Tier::BrowserHeaded,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Direct => "direct",
            Tier::AltUserAgent => "alt_user_agent",
            Tier::SessionReuse => "session_reuse",
            Tier::BrowserHeadless => "browser_headless",
            Tier::BrowserHeaded => "browser_headed",
        }
    }

    #[must_use]
    pub fn is_browser(self) -> bool {
        matches!(self, Tier::BrowserHeadless | Tier::BrowserHeaded)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one attempt: the outcome plus any refreshed session
#[derive(Debug, Clone)]
pub struct StrategyAttempt {
    pub outcome: FetchOutcome,
    /// New snapshot when the attempt produced cookies or a token
    pub session: Option<SessionState>,
}

impl StrategyAttempt {
    #[must_use]
    pub fn new(outcome: FetchOutcome) -> Self {
        Self {
            outcome,
            session: None,
        }
    }

    #[must_use]
    pub fn with_session(outcome: FetchOutcome, session: SessionState) -> Self {
        Self {
            outcome,
            session: Some(session),
        }
    }
}

/// Whether a tier can serve requests right now
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    Ready,
    /// The readiness check failed with this (non-success) outcome
    NotReady(FetchOutcome),
}

impl Readiness {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Attempt one page for one request, given the current session
///
/// `Err` is reserved for failures that end the run (no browser engine,
/// launch failure). Refusals and transport problems come back as
/// [`FetchOutcome`] values.
#[async_trait]
pub trait FetchStrategy: Send {
    fn tier(&self) -> Tier;

    /// Check the tier can serve `request` before its first attempt
    ///
    /// Browser tiers probe with a one-row request here; the headed tier
    /// first waits for a human to clear the challenge. `NotReady` carries
    /// the outcome that failed the check, so a refused probe can be told
    /// apart from a transport failure.
    async fn prepare(
        &mut self,
        _request: &FetchRequest,
        _session: &SessionState,
    ) -> HarvestResult<Readiness> {
        Ok(Readiness::Ready)
    }

    async fn attempt(
        &mut self,
        request: &FetchRequest,
        session: &SessionState,
    ) -> HarvestResult<StrategyAttempt>;

    /// Release any resource held by the strategy
    async fn shutdown(&mut self) {}
}
