// src/poll/status.rs
use super::wait_for_condition;
use crate::clients::types::ResourceStatus;
use crate::clients::{ComputeApi, NetworkApi};
use crate::error::{Result, ScenarioError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Anything whose status can be fetched by id.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn current_status(&self, id: &str) -> Result<ResourceStatus>;

    fn kind(&self) -> &'static str;
}

pub struct VipStatus<'a>(pub &'a dyn NetworkApi);

#[async_trait]
impl StatusSource for VipStatus<'_> {
    async fn current_status(&self, id: &str) -> Result<ResourceStatus> {
        Ok(self.0.get_vip(id).await?.status)
    }

    fn kind(&self) -> &'static str {
        "vip"
    }
}

pub struct ServerStatus<'a>(pub &'a dyn ComputeApi);

#[async_trait]
impl StatusSource for ServerStatus<'_> {
    async fn current_status(&self, id: &str) -> Result<ResourceStatus> {
        Ok(self.0.get_server(id).await?.status)
    }

    fn kind(&self) -> &'static str {
        "server"
    }
}

/// Fixed-interval status poller; no backoff, no jitter.
#[derive(Debug, Clone, Copy)]
pub struct ResourceStatusPoller {
    interval: Duration,
}

impl ResourceStatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until `source` reports `expected` for `id`.
    ///
    /// Fails with [`ScenarioError::Timeout`] when `timeout` elapses first,
    /// and with [`ScenarioError::ResourceFailed`] as soon as the resource
    /// reports `ERROR` while something else is expected.
    pub async fn wait_for_status<S>(
        &self,
        source: &S,
        id: &str,
        expected: &ResourceStatus,
        timeout: Duration,
    ) -> Result<()>
    where
        S: StatusSource + ?Sized,
    {
        let what = format!("{} {} to become {}", source.kind(), id, expected);
        let resource = what.as_str();

        wait_for_condition(resource, timeout, self.interval, || async move {
            let status = source.current_status(id).await?;
            debug!("{} {} is {}", source.kind(), id, status);

            if status == *expected {
                Ok(Some(()))
            } else if status.is_error() {
                Err(ScenarioError::ResourceFailed {
                    resource: format!("{} {}", source.kind(), id),
                    status: status.to_string(),
                    expected: expected.to_string(),
                })
            } else {
                Ok(None)
            }
        })
        .await?;

        info!("{} {} is {}", source.kind(), id, expected);
        Ok(())
    }
}
