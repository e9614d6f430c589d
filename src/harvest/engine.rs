//! Wires configuration, session, strategies and paginator together

use tracing::{info, warn};

use super::report::{HarvestReport, KeywordSummary};
use crate::browser::{BrowserManager, ChromiumRenderer};
use crate::config::HarvestConfig;
use crate::error::HarvestResult;
use crate::fetch::{BrowserStrategy, HttpStrategy, StdinGate};
use crate::keyword_matcher::KeywordMatcher;
use crate::orchestrator::{FallbackOrchestrator, OrchestratorOptions};
use crate::paginator::{KeywordHarvest, PageSource, Paginator};
use crate::records::merge_batches;
use crate::session::{SessionState, SessionStore};

/// Stored session with the configured cookie header and token layered on top
#[must_use]
pub fn initial_session(config: &HarvestConfig, store: &SessionStore) -> SessionState {
    let mut session = store.load();

    if let Some(header) = config.cookie_header() {
        let imported = SessionState::from_cookie_header(header);
        info!("Imported {} cookies from cookie header", imported.cookies().len());
        session = session.with_merged_cookies(imported.cookies().to_vec());
    }
    if let Some(token) = config.auth_token() {
        session = session.with_auth_token(Some(token.to_string()));
    }

    info!(
        cookies = session.cookies().len(),
        auth = session.has_auth_signal(),
        "Session ready"
    );
    session
}

/// Orchestrator with every tier the configuration allows
///
/// The headless and headed tiers share one browser manager; the browser
/// itself is only launched if a browser tier is reached.
pub fn build_orchestrator(
    config: &HarvestConfig,
    session: SessionState,
    store: Option<SessionStore>,
) -> HarvestResult<FallbackOrchestrator> {
    let target = config.api_target()?;
    let settings = config.http_settings();
    let (retry_ceiling, retry_delay) = (settings.retry_ceiling, settings.retry_delay);
    let manager = BrowserManager::new(config.proxy_url().map(str::to_string));
    let home = target.home_url().clone();

    let options = OrchestratorOptions {
        allow_interactive: config.allow_interactive(),
        remember_proven: config.remember_proven_strategy(),
    };

    let headless = ChromiumRenderer::new(
        manager.clone(),
        true,
        home.clone(),
        config.navigation_timeout(),
    );

    let mut orchestrator = FallbackOrchestrator::new(session, store, options)
        .with_strategy(Box::new(HttpStrategy::direct(target.clone(), settings.clone())?))
        .with_strategy(Box::new(HttpStrategy::alt_user_agent(
            target.clone(),
            settings.clone(),
        )?))
        .with_strategy(Box::new(HttpStrategy::session_reuse(target.clone(), settings)?))
        .with_strategy(Box::new(
            BrowserStrategy::headless(headless, target.clone())
                .with_transport_retry(retry_ceiling, retry_delay),
        ));

    if config.allow_interactive() {
        let headed = ChromiumRenderer::new(manager, false, home, config.navigation_timeout());
        orchestrator = orchestrator.with_strategy(Box::new(
            BrowserStrategy::headed(headed, target, Box::new(StdinGate), config.poll_policy())
                .with_transport_retry(retry_ceiling, retry_delay),
        ));
    }

    Ok(orchestrator)
}

/// Run every configured keyword and merge the results
///
/// The browser is released before returning, on success and on error.
pub async fn harvest(config: &HarvestConfig) -> HarvestResult<HarvestReport> {
    let store = config.session_store();
    let session = initial_session(config, &store);
    let mut orchestrator = build_orchestrator(config, session, Some(store))?;

    let result = run_with_source(&mut orchestrator, config).await;
    orchestrator.shutdown().await;
    result
}

/// Paginate every keyword through `source`, then dedup and sort
///
/// A run-ending error from the source discards everything collected so far.
pub async fn run_with_source<S: PageSource + ?Sized>(
    source: &mut S,
    config: &HarvestConfig,
) -> HarvestResult<HarvestReport> {
    let paginator = Paginator::new(config.page_size(), config.max_pages());
    let mut harvests: Vec<KeywordHarvest> = Vec::with_capacity(config.keywords().len());

    info!(
        keywords = config.keywords().len(),
        from = %config.date_from(),
        to = %config.date_to(),
        "Starting harvest"
    );

    for keyword in config.keywords() {
        let harvest = paginator
            .collect(&mut *source, keyword, config.date_from(), config.date_to())
            .await?;
        harvests.push(harvest);
    }

    let matcher = config
        .client_filter()
        .then(|| KeywordMatcher::new(config.keywords()));
    let records = merge_batches(
        harvests
            .iter()
            .map(|h| (h.keyword.as_str(), h.replies.as_slice())),
        matcher,
    );

    let keywords: Vec<KeywordSummary> = harvests.iter().map(KeywordSummary::from).collect();
    let last_tier = harvests.iter().rev().find_map(|h| h.last_tier);
    let collected: usize = keywords.iter().map(|k| k.replies).sum();

    let report = HarvestReport {
        records,
        keywords,
        last_tier,
    };
    for failed in report.failed_keywords() {
        warn!(keyword = %failed.keyword, "Keyword incomplete: {}", failed.stop_reason);
    }
    info!(
        collected,
        records = report.records.len(),
        last_tier = ?report.last_tier,
        "Harvest finished"
    );
    Ok(report)
}
