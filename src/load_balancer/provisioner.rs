// src/load_balancer/provisioner.rs
use super::algorithm::{HealthMonitorSpec, LbMethod, Protocol};
use super::placement::{plan_members, BackendServer};
use crate::clients::types::{
    FloatingIpCreate, HealthMonitorCreate, MemberCreate, PoolCreate, ResourceStatus, Subnet, VipCreate,
};
use crate::clients::NetworkApi;
use crate::error::{Result, ScenarioError};
use crate::names::rand_name;
use crate::poll::{ResourceStatusPoller, VipStatus};
use crate::scenario::{CreatedResource, ResourceLedger};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const VIP_PORT: u16 = 80;

#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub tenant_id: String,
    pub vip_timeout: Duration,
    /// Floating IPs are allocated from this network; without it the VIP
    /// address is used directly.
    pub public_network_id: Option<String>,
    pub health_monitor: Option<HealthMonitorSpec>,
}

/// Handles of everything `provision` created.
#[derive(Debug, Clone, Serialize)]
pub struct Provisioned {
    pub pool_id: String,
    pub member_ids: Vec<String>,
    pub vip_id: String,
    pub vip_address: String,
    pub health_monitor_id: Option<String>,
    pub floating_ip_id: Option<String>,
    pub floating_ip_address: Option<String>,
}

impl Provisioned {
    /// Address probes should target.
    pub fn address(&self) -> &str {
        self.floating_ip_address.as_deref().unwrap_or(&self.vip_address)
    }
}

pub struct LoadBalancerProvisioner {
    network: Arc<dyn NetworkApi>,
    poller: ResourceStatusPoller,
    settings: ProvisionSettings,
}

impl LoadBalancerProvisioner {
    pub fn new(network: Arc<dyn NetworkApi>, poller: ResourceStatusPoller, settings: ProvisionSettings) -> Self {
        Self {
            network,
            poller,
            settings,
        }
    }

    /// The tenant's only subnet; zero or several is an error.
    pub async fn resolve_subnet(&self) -> Result<Subnet> {
        let mut subnets = self.network.list_subnets(&self.settings.tenant_id).await?;
        if subnets.len() != 1 {
            return Err(ScenarioError::AmbiguousSubnet {
                tenant_id: self.settings.tenant_id.clone(),
                found: subnets.len(),
            });
        }
        Ok(subnets.remove(0))
    }

    /// Pool, members, VIP (waited to ACTIVE and checked against the pool),
    /// health monitor, floating IP.
    ///
    /// Every resource is recorded in `ledger` right after it is created so a
    /// failure half way still tears down what exists.
    pub async fn provision(
        &self,
        ledger: &mut ResourceLedger,
        servers: &[BackendServer],
        ports: &[u16],
    ) -> Result<Provisioned> {
        let subnet = self.resolve_subnet().await?;
        info!("Using subnet {} ({})", subnet.id, subnet.cidr);

        let pool = self
            .network
            .create_pool(&PoolCreate {
                name: rand_name("pool-"),
                lb_method: LbMethod::RoundRobin,
                protocol: Protocol::Http,
                subnet_id: subnet.id.clone(),
            })
            .await?;
        ledger.record(CreatedResource::Pool(pool.id.clone()));

        let targets = plan_members(servers, ports);
        if targets.is_empty() {
            return Err(ScenarioError::missing("backend servers for pool members"));
        }

        let mut member_ids = Vec::with_capacity(targets.len());
        for target in &targets {
            let member = self
                .network
                .create_member(&MemberCreate {
                    address: target.address.clone(),
                    protocol_port: target.port,
                    pool_id: pool.id.clone(),
                })
                .await?;
            ledger.record(CreatedResource::Member(member.id.clone()));
            member_ids.push(member.id);
        }

        let vip = self
            .network
            .create_vip(&VipCreate {
                name: rand_name("vip-"),
                protocol: Protocol::Http,
                protocol_port: VIP_PORT,
                subnet_id: subnet.id.clone(),
                pool_id: pool.id.clone(),
            })
            .await?;
        ledger.record(CreatedResource::Vip(vip.id.clone()));

        self.poller
            .wait_for_status(
                &VipStatus(self.network.as_ref()),
                &vip.id,
                &ResourceStatus::Active,
                self.settings.vip_timeout,
            )
            .await?;

        self.confirm_registration(&pool.id, &vip.id, &member_ids).await?;

        let health_monitor_id = match self.settings.health_monitor {
            Some(spec) => Some(self.attach_health_monitor(ledger, &pool.id, spec).await?),
            None => None,
        };

        // The VIP is ACTIVE at this point; attaching earlier is not routable.
        let floating_ip = match &self.settings.public_network_id {
            Some(public_network_id) => {
                let floating_ip = self
                    .network
                    .create_floating_ip(&FloatingIpCreate {
                        floating_network_id: public_network_id.clone(),
                        port_id: vip.port_id.clone(),
                    })
                    .await?;
                ledger.record(CreatedResource::FloatingIp(floating_ip.id.clone()));
                Some(floating_ip)
            }
            None => {
                info!("No public network configured, probing VIP {} directly", vip.address);
                None
            }
        };

        Ok(Provisioned {
            pool_id: pool.id,
            member_ids,
            vip_id: vip.id,
            vip_address: vip.address,
            health_monitor_id,
            floating_ip_id: floating_ip.as_ref().map(|f| f.id.clone()),
            floating_ip_address: floating_ip.map(|f| f.floating_ip_address),
        })
    }

    /// The pool must list every member and the VIP, and both the pool and
    /// the VIP must show up in their collections.
    pub async fn confirm_registration(&self, pool_id: &str, vip_id: &str, member_ids: &[String]) -> Result<()> {
        let resource = format!("pool {}", pool_id);
        let pool = self.network.get_pool(pool_id).await?;

        if pool.vip_id.as_deref() != Some(vip_id) {
            return Err(ScenarioError::Registration {
                resource,
                detail: format!("bound to VIP {:?}, expected {}", pool.vip_id, vip_id),
            });
        }
        if let Some(missing) = member_ids.iter().find(|id| !pool.members.contains(*id)) {
            return Err(ScenarioError::Registration {
                resource,
                detail: format!("member {} is not listed", missing),
            });
        }

        if !self.network.list_pools().await?.iter().any(|p| p.id == pool_id) {
            return Err(ScenarioError::Registration {
                resource,
                detail: "missing from the pool list".to_string(),
            });
        }
        if !self.network.list_vips().await?.iter().any(|v| v.id == vip_id) {
            return Err(ScenarioError::Registration {
                resource: format!("VIP {}", vip_id),
                detail: "missing from the VIP list".to_string(),
            });
        }

        debug!("Pool {} serves VIP {} with {} member(s)", pool_id, vip_id, pool.members.len());
        Ok(())
    }

    async fn attach_health_monitor(
        &self,
        ledger: &mut ResourceLedger,
        pool_id: &str,
        spec: HealthMonitorSpec,
    ) -> Result<String> {
        let monitor = self
            .network
            .create_health_monitor(&HealthMonitorCreate {
                kind: spec.kind,
                delay: spec.delay,
                timeout: spec.timeout,
                max_retries: spec.max_retries,
            })
            .await?;
        ledger.record(CreatedResource::HealthMonitor(monitor.id.clone()));

        self.network.associate_health_monitor(pool_id, &monitor.id).await?;
        ledger.record(CreatedResource::HealthMonitorAssociation {
            pool_id: pool_id.to_string(),
            monitor_id: monitor.id.clone(),
        });

        Ok(monitor.id)
    }
}
