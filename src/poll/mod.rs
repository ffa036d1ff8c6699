// src/poll/mod.rs
mod status;

pub use status::{ResourceStatusPoller, ServerStatus, StatusSource, VipStatus};

use crate::error::{Result, ScenarioError};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Run `check` every `interval` until it yields a value or `timeout` passes.
///
/// `check` returns `Ok(None)` while the condition does not hold yet; an
/// `Err` aborts the wait immediately. The condition is checked one last
/// time at the deadline before giving up. A `timeout` too large to form a
/// deadline is rejected before `check` runs.
pub async fn wait_for_condition<F, Fut, T>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start.checked_add(timeout).ok_or_else(|| {
        ScenarioError::Config(format!("timeout {:?} for {} is out of range", timeout, what))
    })?;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        if let Some(value) = check().await? {
            debug!("{} ready after {} attempt(s)", what, attempt);
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ScenarioError::Timeout {
                resource: what.to_string(),
                elapsed: now - start,
            });
        }

        debug!("{} not ready (attempt {}), retrying in {:?}", what, attempt, interval);
        sleep(interval.min(deadline - now)).await;
    }
}
