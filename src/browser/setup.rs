//! Locating, downloading and launching Chrome/Chromium

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use super::profile::create_unique_profile;
use super::wrapper::BrowserWrapper;
use crate::error::{HarvestError, HarvestResult};
use crate::utils::constants::PRIMARY_USER_AGENT;
use crate::utils::paths::default_config_dir;

/// Environment variable overriding executable discovery
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Find a Chrome/Chromium executable in the usual platform locations
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {}: {}", CHROMIUM_PATH_ENV, path.display());
            return Ok(path);
        }
        warn!(
            "{} points to non-existent file: {}",
            CHROMIUM_PATH_ENV,
            path.display()
        );
    }

    let paths = if cfg!(target_os = "windows") {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        vec![
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = if let Some(rest) = path_str.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else if cfg!(target_os = "windows") && path_str.contains('%') {
            PathBuf::from(expand_windows_env_vars(path_str))
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser using 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found, will try the managed download");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Replace `%VAR%` tokens with environment values, leaving unknown ones as-is
fn expand_windows_env_vars(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) if !name.is_empty() => result.push_str(&value),
                    _ => {
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Download Chromium into the config directory and return its executable
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = default_config_dir().join("chromium");
    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// Find the executable, downloading one when none is installed
pub async fn resolve_browser_executable() -> HarvestResult<PathBuf> {
    match find_browser_executable().await {
        Ok(path) => Ok(path),
        Err(_) => download_managed_browser()
            .await
            .map_err(|e| HarvestError::BrowserUnavailable(format!("{e:#}"))),
    }
}

/// Launch Chrome with stealth flags, optionally through `proxy`
///
/// Returns the browser and its tracked handler task. The caller owns
/// `user_data_dir` and must remove it after the browser exits.
pub async fn launch_browser(
    chrome_path: PathBuf,
    headless: bool,
    proxy: Option<&str>,
    user_data_dir: PathBuf,
) -> Result<(Browser, JoinHandle<()>)> {
    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1366, 900)
        .user_data_dir(user_data_dir)
        .chrome_executable(chrome_path);

    config_builder = if headless {
        config_builder.headless_mode(HeadlessMode::default())
    } else {
        config_builder.with_head()
    };

    config_builder = config_builder.args(launch_args(proxy));

    let browser_config = config_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(headless, proxied = proxy.is_some(), "Launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let error_msg = e.to_string();
                // chromiumoxide cannot decode some newer CDP events; those are noise
                let is_benign = error_msg
                    .contains("data did not match any variant of untagged enum Message")
                    || error_msg.contains("Failed to deserialize WS response");
                if is_benign {
                    trace!("Suppressed benign CDP serialization error: {}", error_msg);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser handler task completed");
    });

    Ok((browser, handler_task))
}

/// Launch a browser, retrying once without the proxy if the proxied launch fails
pub async fn launch_with_proxy_fallback(
    headless: bool,
    proxy: Option<&str>,
) -> HarvestResult<BrowserWrapper> {
    let chrome_path = resolve_browser_executable().await?;

    let first = launch_in_fresh_profile(chrome_path.clone(), headless, proxy).await;
    let error = match first {
        Ok(wrapper) => return Ok(wrapper),
        Err(e) => e,
    };

    if proxy.is_none() {
        return Err(HarvestError::BrowserLaunch(format!("{error:#}")));
    }

    warn!("Browser launch with proxy failed, retrying without proxy: {:#}", error);
    launch_in_fresh_profile(chrome_path, headless, None)
        .await
        .map_err(|e| HarvestError::BrowserLaunch(format!("{e:#}")))
}

async fn launch_in_fresh_profile(
    chrome_path: PathBuf,
    headless: bool,
    proxy: Option<&str>,
) -> Result<BrowserWrapper> {
    let profile = create_unique_profile()?;
    let (browser, handler) =
        launch_browser(chrome_path, headless, proxy, profile.path().to_path_buf()).await?;
    // Launch succeeded: the wrapper now owns the directory
    Ok(BrowserWrapper::new(browser, handler, profile.into_path(), headless))
}

/// Command-line flags for every launch: identity, stealth, optional proxy
fn launch_args(proxy: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = proxy
        .map(|proxy| format!("--proxy-server={proxy}"))
        .into_iter()
        .collect();
    args.push(format!("--user-agent={PRIMARY_USER_AGENT}"));
    args.extend(
        [
            "--lang=id-ID",
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--disable-notifications",
            "--disable-setuid-sandbox",
            "--no-first-run",
            "--no-default-browser-check",
            "--no-sandbox",
            "--disable-extensions",
            "--disable-popup-blocking",
            "--disable-background-timer-throttling",
            "--disable-backgrounding-occluded-windows",
            "--disable-breakpad",
            "--disable-features=TranslateUI",
            "--disable-hang-monitor",
            "--disable-prompt-on-repost",
            "--password-store=basic",
            "--use-mock-keychain",
            "--mute-audio",
        ]
        .map(String::from),
    );
    args
}

#[cfg(test)]
mod tests {
    use super::{PRIMARY_USER_AGENT, expand_windows_env_vars, launch_args};

    #[test]
    fn browser_presents_the_http_user_agent() {
        let args = launch_args(None);
        assert!(args.contains(&format!("--user-agent={PRIMARY_USER_AGENT}")));
        assert!(!args.iter().any(|a| a.starts_with("--proxy-server")));

        let proxied = launch_args(Some("http://10.0.0.1:8080"));
        assert_eq!(proxied[0], "--proxy-server=http://10.0.0.1:8080");
    }

    #[test]
    fn expands_known_and_keeps_unknown_tokens() {
        // SAFETY: test-local variable, no other thread reads it
        unsafe { std::env::set_var("IDX_SCRAPE_TEST_DIR", "C:\\Data") };
        assert_eq!(
            expand_windows_env_vars("%IDX_SCRAPE_TEST_DIR%\\chrome.exe"),
            "C:\\Data\\chrome.exe"
        );
        assert_eq!(
            expand_windows_env_vars("%IDX_SCRAPE_MISSING%\\x"),
            "%IDX_SCRAPE_MISSING%\\x"
        );
        assert_eq!(expand_windows_env_vars("50%"), "50%");
    }
}
