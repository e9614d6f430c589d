//! Interactive session capture
//!
//! Opens a visible browser on the home page and waits for the user to log
//! in or clear a challenge by hand. No form is filled automatically.

use tracing::{info, warn};

use super::engine::initial_session;
use crate::browser::{BrowserManager, ChromiumRenderer};
use crate::config::HarvestConfig;
use crate::error::HarvestResult;
use crate::fetch::{ChallengeGate, PageRenderer, StdinGate};
use crate::session::{SessionState, SessionStore};

const LOGIN_PROMPT: &str = "Log in to the IDX site in the browser window, then press Enter here to save the session.";

/// Capture the renderer's session after the gate opens, merge and persist it
///
/// The renderer is closed on every path.
pub async fn capture_interactive_session<R, G>(
    renderer: &mut R,
    gate: &mut G,
    store: &SessionStore,
    seed: &SessionState,
) -> HarvestResult<SessionState>
where
    R: PageRenderer + ?Sized,
    G: ChallengeGate + ?Sized,
{
    let result = capture(renderer, gate, store, seed).await;
    renderer.close().await;
    result
}

async fn capture<R, G>(
    renderer: &mut R,
    gate: &mut G,
    store: &SessionStore,
    seed: &SessionState,
) -> HarvestResult<SessionState>
where
    R: PageRenderer + ?Sized,
    G: ChallengeGate + ?Sized,
{
    renderer.open(seed).await?;
    gate.wait_for_confirmation(LOGIN_PROMPT).await?;

    let captured = renderer.capture_session().await?;
    let token = captured
        .local_auth_token()
        .or_else(|| seed.local_auth_token())
        .map(str::to_string);
    let session = seed
        .with_merged_cookies(captured.cookies().to_vec())
        .with_auth_token(token);

    if !session.has_auth_signal() {
        warn!("No auth marker found in the captured session; API calls may still be refused");
    }
    store.save(&session)?;
    info!(
        cookies = session.cookies().len(),
        "Session saved to {}",
        store.storage_path().display()
    );
    Ok(session)
}

/// Headed browser login using the configured storage paths
pub async fn login(config: &HarvestConfig) -> HarvestResult<SessionState> {
    let store = config.session_store();
    let seed = initial_session(config, &store);
    let target = config.api_target()?;

    let manager = BrowserManager::new(config.proxy_url().map(str::to_string));
    let mut renderer = ChromiumRenderer::new(
        manager,
        false,
        target.home_url().clone(),
        config.navigation_timeout(),
    );
    capture_interactive_session(&mut renderer, &mut StdinGate, &store, &seed).await
}
