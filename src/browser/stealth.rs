//! Evasion scripts installed before any site script runs

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::page::Page;
use tracing::debug;

const EVASIONS: &[(&str, &str)] = &[
    (
        "webdriver",
        r"Object.defineProperty(navigator, 'webdriver', { get: () => undefined });",
    ),
    (
        "languages",
        r"Object.defineProperty(navigator, 'languages', { get: () => ['id-ID', 'id', 'en-US', 'en'] });",
    ),
    (
        "chrome.runtime",
        r"
        if (!window.chrome) { window.chrome = {}; }
        if (!window.chrome.runtime) {
            window.chrome.runtime = {
                connect: () => ({
                    onMessage: { addListener: () => {}, removeListener: () => {} },
                    postMessage: () => {}
                })
            };
        }
        ",
    ),
    (
        "webgl vendor",
        r"
        if (window.WebGLRenderingContext) {
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = new Proxy(getParameter, {
                apply(target, ctx, args) {
                    const param = (args && args[0]) || null;
                    if (param === 37445) { return 'Intel Inc.'; }
                    if (param === 37446) { return 'Intel Iris OpenGL Engine'; }
                    return Reflect.apply(target, ctx, args);
                }
            });
        }
        ",
    ),
];

/// Register the evasion scripts on `page`; they run on every new document
pub async fn inject(page: &Page) -> Result<()> {
    for (name, source) in EVASIONS {
        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: (*source).to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await?;
        debug!("Injected evasion: {}", name);
    }
    Ok(())
}
