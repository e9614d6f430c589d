//! Test utilities and doubles shared by the idx_scrape test suite

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use idx_scrape::error::{HarvestError, HarvestResult};
use idx_scrape::fetch::{
    ChallengeGate, FetchOutcome, FetchRequest, FetchStrategy, PageRenderer, Readiness,
    StrategyAttempt, Tier,
};
use idx_scrape::records::{Announcement, RawReply};
use idx_scrape::session::{SessionState, StoredCookie};
use idx_scrape::utils::AUTH_MARKER;
use serde_json::json;
use url::Url;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Reply with the three output fields set
pub fn reply(code: &str, title: &str, raw_date: &str) -> RawReply {
    RawReply {
        pengumuman: Announcement {
            kode_emiten: Some(code.to_string()),
            judul: Some(title.to_string()),
            tanggal: Some(raw_date.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// API body in the server's shape
pub fn api_body(total: u64, replies: &[(&str, &str, &str)]) -> String {
    let replies: Vec<_> = replies
        .iter()
        .map(|(code, title, date)| {
            json!({
                "pengumuman": {
                    "Kode_Emiten": code,
                    "JudulPengumuman": title,
                    "TglPengumuman": date,
                },
                "attachments": []
            })
        })
        .collect();
    json!({ "ResultCount": total, "Replies": replies }).to_string()
}

pub fn success(replies: Vec<RawReply>, total: u64) -> FetchOutcome {
    FetchOutcome::Success {
        replies,
        total_count: Some(total),
    }
}

pub fn blocked() -> FetchOutcome {
    FetchOutcome::Blocked {
        reason: "HTTP 403".to_string(),
    }
}

pub fn transport(cause: &str) -> FetchOutcome {
    FetchOutcome::TransportError {
        cause: cause.to_string(),
    }
}

pub fn challenge() -> FetchOutcome {
    FetchOutcome::NonJson {
        excerpt: "<html>Just a moment...</html>".to_string(),
    }
}

/// Session carrying the auth marker cookie
pub fn authed_session() -> SessionState {
    SessionState::new(
        vec![StoredCookie::new(AUTH_MARKER, "secret", ".idx.co.id", "/")],
        None,
    )
}

/// Shared record of `(tier, keyword, offset)` for every attempt
pub type CallLog = Arc<Mutex<Vec<(Tier, String, u32)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn tiers_called(log: &CallLog) -> Vec<Tier> {
    log.lock().unwrap().iter().map(|(tier, _, _)| *tier).collect()
}

/// Strategy that replays scripted outcomes, then repeats a fallback
pub struct ScriptedStrategy {
    tier: Tier,
    script: VecDeque<FetchOutcome>,
    fallback: FetchOutcome,
    session_on_success: Option<SessionState>,
    readiness: Readiness,
    log: CallLog,
    shutdowns: Arc<Mutex<u32>>,
}

impl ScriptedStrategy {
    pub fn new(tier: Tier, fallback: FetchOutcome, log: &CallLog) -> Self {
        Self {
            tier,
            script: VecDeque::new(),
            fallback,
            session_on_success: None,
            readiness: Readiness::Ready,
            log: Arc::clone(log),
            shutdowns: Arc::new(Mutex::new(0)),
        }
    }

    pub fn then(mut self, outcome: FetchOutcome) -> Self {
        self.script.push_back(outcome);
        self
    }

    pub fn yielding_session(mut self, session: SessionState) -> Self {
        self.session_on_success = Some(session);
        self
    }

    /// Fail the readiness check with `outcome`
    pub fn not_ready(mut self, outcome: FetchOutcome) -> Self {
        self.readiness = Readiness::NotReady(outcome);
        self
    }

    pub fn shutdown_counter(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.shutdowns)
    }
}

#[async_trait]
impl FetchStrategy for ScriptedStrategy {
    fn tier(&self) -> Tier {
        self.tier
    }

    async fn prepare(
        &mut self,
        _request: &FetchRequest,
        _session: &SessionState,
    ) -> HarvestResult<Readiness> {
        Ok(self.readiness.clone())
    }

    async fn attempt(
        &mut self,
        request: &FetchRequest,
        _session: &SessionState,
    ) -> HarvestResult<StrategyAttempt> {
        self.log.lock().unwrap().push((
            self.tier,
            request.keyword().to_string(),
            request.page_offset(),
        ));
        let outcome = self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match (&outcome, &self.session_on_success) {
            (FetchOutcome::Success { .. }, Some(session)) => {
                Ok(StrategyAttempt::with_session(outcome, session.clone()))
            }
            _ => Ok(StrategyAttempt::new(outcome)),
        }
    }

    async fn shutdown(&mut self) {
        *self.shutdowns.lock().unwrap() += 1;
    }
}

/// Counters observed on a [`ScriptedRenderer`]
#[derive(Debug, Default)]
pub struct RendererLog {
    pub opens: u32,
    pub fetched: Vec<Url>,
    pub resets: u32,
    pub closes: u32,
}

/// Renderer that replays scripted outcomes, then repeats a fallback
pub struct ScriptedRenderer {
    script: VecDeque<FetchOutcome>,
    fallback: FetchOutcome,
    captured: SessionState,
    log: Arc<Mutex<RendererLog>>,
}

impl ScriptedRenderer {
    pub fn new(fallback: FetchOutcome) -> Self {
        Self {
            script: VecDeque::new(),
            fallback,
            captured: SessionState::empty(),
            log: Arc::new(Mutex::new(RendererLog::default())),
        }
    }

    pub fn then(mut self, outcome: FetchOutcome) -> Self {
        self.script.push_back(outcome);
        self
    }

    pub fn capturing(mut self, session: SessionState) -> Self {
        self.captured = session;
        self
    }

    pub fn log(&self) -> Arc<Mutex<RendererLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn open(&mut self, _session: &SessionState) -> HarvestResult<()> {
        self.log.lock().unwrap().opens += 1;
        Ok(())
    }

    async fn render_and_fetch(
        &mut self,
        url: &Url,
        _session: &SessionState,
    ) -> HarvestResult<FetchOutcome> {
        self.log.lock().unwrap().fetched.push(url.clone());
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    async fn capture_session(&mut self) -> HarvestResult<SessionState> {
        Ok(self.captured.clone())
    }

    async fn reset(&mut self) {
        self.log.lock().unwrap().resets += 1;
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

/// Gate that confirms at once, or fails like a closed stdin
pub struct AutoGate {
    pub confirmations: Arc<Mutex<u32>>,
    fail: bool,
}

impl AutoGate {
    pub fn confirming() -> Self {
        Self {
            confirmations: Arc::new(Mutex::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            confirmations: Arc::new(Mutex::new(0)),
            fail: true,
        }
    }
}

#[async_trait]
impl ChallengeGate for AutoGate {
    async fn wait_for_confirmation(&mut self, _prompt: &str) -> HarvestResult<()> {
        if self.fail {
            return Err(HarvestError::AuthRequired("stdin closed".to_string()));
        }
        *self.confirmations.lock().unwrap() += 1;
        Ok(())
    }
}
