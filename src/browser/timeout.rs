use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run a page operation under `tokio::time::timeout`
///
/// Distinguishes the timeout from the operation's own failure in the
/// returned error message.
pub async fn with_page_timeout<F, T>(operation: F, timeout: Duration, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{operation_name} timed out after {} seconds",
            timeout.as_secs()
        )),
    }
}
