//! Bounded polling for resources that become ready asynchronously

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Time between poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Poll until `poll_fn` yields a value or `timeout` expires.
///
/// `poll_fn` returns `Ok(Some(T))` when ready, `Ok(None)` to keep waiting,
/// or `Err(msg)` for a transient failure that is logged and retried.
pub async fn wait_for_resource<T, F, Fut>(
    description: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut poll_fn: F,
) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, String>>,
{
    let start = Instant::now();

    loop {
        match poll_fn().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "poll error waiting for {}, retrying", description),
        }

        if start.elapsed() >= timeout {
            return Err(format!(
                "timed out after {:?} waiting for {}",
                timeout, description
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
