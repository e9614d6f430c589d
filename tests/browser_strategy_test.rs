//! Browser tiers over a scripted renderer, plus interactive login capture

use std::time::Duration;

use idx_scrape::fetch::{
    ApiTarget, BrowserStrategy, FetchOutcome, FetchRequest, FetchStrategy, PollPolicy, Readiness,
};
use idx_scrape::harvest::capture_interactive_session;
use idx_scrape::session::{SessionState, SessionStore, StoredCookie};
use idx_scrape::utils::AUTH_MARKER;
use tempfile::TempDir;

mod common;
use common::*;

fn target() -> ApiTarget {
    ApiTarget::new(
        "https://www.idx.co.id/primary/ListedCompany/GetAnnouncement",
        "https://www.idx.co.id/",
        "*",
        "id",
    )
    .unwrap()
}

fn request() -> FetchRequest {
    FetchRequest::first_page("Kontrak Penting", date(2024, 1, 1), date(2024, 1, 3), 50)
}

#[tokio::test]
async fn headless_probes_once_and_stays_ready() {
    let renderer = ScriptedRenderer::new(success(Vec::new(), 0));
    let log = renderer.log();
    let mut strategy = BrowserStrategy::headless(renderer, target());
    let session = SessionState::empty();

    assert!(strategy.prepare(&request(), &session).await.unwrap().is_ready());
    assert!(strategy.prepare(&request(), &session).await.unwrap().is_ready());
    assert_eq!(log.lock().unwrap().fetched.len(), 1);
}

#[tokio::test]
async fn success_returns_the_captured_session() {
    let captured = SessionState::new(
        vec![StoredCookie::new(AUTH_MARKER, "t", ".idx.co.id", "/")],
        None,
    );
    let renderer = ScriptedRenderer::new(success(vec![reply("ABC", "X", "2024-01-01")], 1))
        .capturing(captured.clone());
    let mut strategy = BrowserStrategy::headless(renderer, target());

    let attempt = strategy
        .attempt(&request(), &SessionState::empty())
        .await
        .unwrap();
    assert!(attempt.outcome.is_success());
    assert!(attempt.session.unwrap().same_contents(&captured));
}

#[tokio::test]
async fn refusal_forces_a_new_probe() {
    let renderer = ScriptedRenderer::new(success(Vec::new(), 0))
        .then(success(Vec::new(), 0))
        .then(challenge());
    let log = renderer.log();
    let mut strategy = BrowserStrategy::headless(renderer, target());
    let session = SessionState::empty();

    assert!(strategy.prepare(&request(), &session).await.unwrap().is_ready());
    let attempt = strategy.attempt(&request(), &session).await.unwrap();
    assert!(matches!(attempt.outcome, FetchOutcome::NonJson { .. }));

    assert!(strategy.prepare(&request(), &session).await.unwrap().is_ready());
    assert_eq!(log.lock().unwrap().fetched.len(), 3);
}

#[tokio::test]
async fn transport_error_resets_the_page_on_every_try() {
    let renderer = ScriptedRenderer::new(transport("Execution context was destroyed"));
    let log = renderer.log();
    let mut strategy =
        BrowserStrategy::headless(renderer, target()).with_transport_retry(2, Duration::ZERO);

    let attempt = strategy
        .attempt(&request(), &SessionState::empty())
        .await
        .unwrap();
    assert!(matches!(attempt.outcome, FetchOutcome::TransportError { .. }));

    let log = log.lock().unwrap();
    assert_eq!(log.fetched.len(), 2);
    assert_eq!(log.resets, 2);
}

#[tokio::test]
async fn transport_error_is_retried_until_success() {
    let renderer = ScriptedRenderer::new(success(vec![reply("ABC", "MTO", "2024-01-01")], 1))
        .then(transport("net::ERR_CONNECTION_RESET"));
    let log = renderer.log();
    let mut strategy =
        BrowserStrategy::headless(renderer, target()).with_transport_retry(3, Duration::ZERO);

    let attempt = strategy
        .attempt(&request(), &SessionState::empty())
        .await
        .unwrap();
    assert!(attempt.outcome.is_success());

    let log = log.lock().unwrap();
    assert_eq!(log.fetched.len(), 2);
    assert_eq!(log.resets, 1);
}

#[tokio::test]
async fn readiness_reports_what_went_wrong() {
    let mut unreachable = BrowserStrategy::headless(
        ScriptedRenderer::new(transport("timeout")),
        target(),
    )
    .with_transport_retry(2, Duration::ZERO);
    let readiness = unreachable
        .prepare(&request(), &SessionState::empty())
        .await
        .unwrap();
    assert!(matches!(
        readiness,
        Readiness::NotReady(FetchOutcome::TransportError { .. })
    ));

    let mut challenged = BrowserStrategy::headless(ScriptedRenderer::new(challenge()), target());
    let readiness = challenged
        .prepare(&request(), &SessionState::empty())
        .await
        .unwrap();
    assert!(matches!(readiness, Readiness::NotReady(FetchOutcome::NonJson { .. })));
}

#[tokio::test]
async fn closed_stdin_during_headed_wait_is_auth_required() {
    let mut strategy = BrowserStrategy::headed(
        ScriptedRenderer::new(success(Vec::new(), 0)),
        target(),
        Box::new(AutoGate::failing()),
        PollPolicy {
            attempts: 2,
            interval: Duration::ZERO,
        },
    );

    let err = strategy
        .prepare(&request(), &SessionState::empty())
        .await
        .unwrap_err();
    assert!(err.is_auth_required());
}

#[tokio::test]
async fn login_merges_capture_into_seed_and_persists() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(
        dir.path().join("state.json"),
        Some(dir.path().join("cookies.json")),
    );
    let seed = SessionState::from_cookie_header("PHPSESSID=old; theme=dark");
    let captured = SessionState::new(
        vec![StoredCookie::new("PHPSESSID", "new", ".idx.co.id", "/")],
        Some("Bearer fresh".to_string()),
    );

    let mut renderer = ScriptedRenderer::new(success(Vec::new(), 0)).capturing(captured);
    let log = renderer.log();
    let mut gate = AutoGate::confirming();

    let session = capture_interactive_session(&mut renderer, &mut gate, &store, &seed)
        .await
        .unwrap();

    assert_eq!(session.local_auth_token(), Some("Bearer fresh"));
    assert!(session.cookies().iter().any(|c| c.name == "PHPSESSID" && c.value == "new"));
    assert!(session.cookies().iter().any(|c| c.name == "theme"));
    assert!(store.load().same_contents(&session));
    assert!(dir.path().join("cookies.json").exists());

    let log = log.lock().unwrap();
    assert_eq!(log.opens, 1);
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn login_closes_the_browser_when_confirmation_fails() {
    let dir = TempDir::new().unwrap();
    let store = SessionStore::new(dir.path().join("state.json"), None);
    let mut renderer = ScriptedRenderer::new(success(Vec::new(), 0));
    let log = renderer.log();

    let result = capture_interactive_session(
        &mut renderer,
        &mut AutoGate::failing(),
        &store,
        &SessionState::empty(),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(log.lock().unwrap().closes, 1);
    assert!(!dir.path().join("state.json").exists());
}
