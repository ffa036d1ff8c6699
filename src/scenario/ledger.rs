// src/scenario/ledger.rs
use crate::clients::{ComputeApi, NetworkApi};
use crate::error::{Result, ScenarioError};
use crate::poll::wait_for_condition;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A resource the run created and must delete again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedResource {
    SecurityGroup(String),
    Keypair(String),
    Server(String),
    Pool(String),
    Member(String),
    Vip(String),
    HealthMonitor(String),
    HealthMonitorAssociation { pool_id: String, monitor_id: String },
    FloatingIp(String),
}

impl fmt::Display for CreatedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreatedResource::SecurityGroup(id) => write!(f, "security group {}", id),
            CreatedResource::Keypair(name) => write!(f, "keypair {}", name),
            CreatedResource::Server(id) => write!(f, "server {}", id),
            CreatedResource::Pool(id) => write!(f, "pool {}", id),
            CreatedResource::Member(id) => write!(f, "member {}", id),
            CreatedResource::Vip(id) => write!(f, "vip {}", id),
            CreatedResource::HealthMonitor(id) => write!(f, "health monitor {}", id),
            CreatedResource::HealthMonitorAssociation { pool_id, monitor_id } => {
                write!(f, "health monitor {} on pool {}", monitor_id, pool_id)
            }
            CreatedResource::FloatingIp(id) => write!(f, "floating ip {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeardownSummary {
    pub deleted: usize,
    pub failed: usize,
}

/// Creation-ordered record of everything the run owns.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    created: Vec<CreatedResource>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, resource: CreatedResource) {
        debug!("Recorded {}", resource);
        self.created.push(resource);
    }

    pub fn resources(&self) -> &[CreatedResource] {
        &self.created
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Delete every recorded resource, newest first.
    ///
    /// Failures are logged and counted, never returned: teardown must not
    /// mask the outcome of the run.
    pub async fn teardown(
        &mut self,
        compute: &dyn ComputeApi,
        network: &dyn NetworkApi,
        server_timeout: Duration,
        interval: Duration,
    ) -> TeardownSummary {
        let mut summary = TeardownSummary::default();

        while let Some(resource) = self.created.pop() {
            match delete(&resource, compute, network, server_timeout, interval).await {
                Ok(()) => {
                    debug!("Deleted {}", resource);
                    summary.deleted += 1;
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", resource, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Teardown complete: {} deleted, {} failed",
            summary.deleted, summary.failed
        );
        summary
    }
}

async fn delete(
    resource: &CreatedResource,
    compute: &dyn ComputeApi,
    network: &dyn NetworkApi,
    server_timeout: Duration,
    interval: Duration,
) -> Result<()> {
    match resource {
        CreatedResource::SecurityGroup(id) => network.delete_security_group(id).await,
        CreatedResource::Keypair(name) => compute.delete_keypair(name).await,
        CreatedResource::Server(id) => {
            compute.delete_server(id).await?;
            // Security groups stay in use until the server is really gone.
            wait_for_server_gone(compute, id, server_timeout, interval).await
        }
        CreatedResource::Pool(id) => network.delete_pool(id).await,
        CreatedResource::Member(id) => network.delete_member(id).await,
        CreatedResource::Vip(id) => network.delete_vip(id).await,
        CreatedResource::HealthMonitor(id) => network.delete_health_monitor(id).await,
        CreatedResource::HealthMonitorAssociation { pool_id, monitor_id } => {
            network.disassociate_health_monitor(pool_id, monitor_id).await
        }
        CreatedResource::FloatingIp(id) => network.delete_floating_ip(id).await,
    }
}

async fn wait_for_server_gone(
    compute: &dyn ComputeApi,
    id: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let what = format!("server {} to be deleted", id);
    wait_for_condition(&what, timeout, interval, || async move {
        match compute.get_server(id).await {
            Err(ScenarioError::Api { status: 404, .. }) => Ok(Some(())),
            Ok(_) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await
}
