// src/clients/network.rs
use super::rest::RestClient;
use super::types::*;
use super::NetworkApi;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

const LB_POOLS: &str = "v2.0/lb/pools";
const LB_VIPS: &str = "v2.0/lb/vips";
const LB_MEMBERS: &str = "v2.0/lb/members";
const LB_HEALTH_MONITORS: &str = "v2.0/lb/health_monitors";

/// Network API client, including the LBaaS v1 resources.
#[derive(Debug, Clone)]
pub struct NetworkClient {
    rest: RestClient,
}

#[derive(Serialize)]
struct MonitorRef<'a> {
    id: &'a str,
}

impl NetworkClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl NetworkApi for NetworkClient {
    async fn list_extensions(&self) -> Result<Vec<Extension>> {
        self.rest.get("v2.0/extensions", "extensions").await
    }

    async fn list_networks(&self, tenant_id: &str) -> Result<Vec<Network>> {
        self.rest
            .get_query("v2.0/networks", &[("tenant_id", tenant_id)], "networks")
            .await
    }

    async fn list_subnets(&self, tenant_id: &str) -> Result<Vec<Subnet>> {
        self.rest
            .get_query("v2.0/subnets", &[("tenant_id", tenant_id)], "subnets")
            .await
    }

    async fn create_security_group(&self, request: &SecurityGroupCreate) -> Result<SecurityGroup> {
        let group: SecurityGroup = self
            .rest
            .post("v2.0/security-groups", "security_group", request)
            .await?;
        info!("Created security group {} ({})", group.name, group.id);
        Ok(group)
    }

    async fn create_security_group_rule(
        &self,
        request: &SecurityGroupRuleCreate,
    ) -> Result<SecurityGroupRule> {
        self.rest
            .post("v2.0/security-group-rules", "security_group_rule", request)
            .await
    }

    async fn delete_security_group(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("v2.0/security-groups/{}", id)).await
    }

    async fn create_pool(&self, request: &PoolCreate) -> Result<Pool> {
        let pool: Pool = self.rest.post(LB_POOLS, "pool", request).await?;
        info!("Created pool {} ({:?}, {:?})", pool.id, pool.lb_method, pool.protocol);
        Ok(pool)
    }

    async fn get_pool(&self, id: &str) -> Result<Pool> {
        self.rest.get(&format!("{}/{}", LB_POOLS, id), "pool").await
    }

    async fn list_pools(&self) -> Result<Vec<Pool>> {
        self.rest.get(LB_POOLS, "pools").await
    }

    async fn delete_pool(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("{}/{}", LB_POOLS, id)).await
    }

    async fn create_member(&self, request: &MemberCreate) -> Result<Member> {
        let member: Member = self.rest.post(LB_MEMBERS, "member", request).await?;
        info!(
            "Created member {} at {}:{}",
            member.id, member.address, member.protocol_port
        );
        Ok(member)
    }

    async fn delete_member(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("{}/{}", LB_MEMBERS, id)).await
    }

    async fn create_vip(&self, request: &VipCreate) -> Result<Vip> {
        let vip: Vip = self.rest.post(LB_VIPS, "vip", request).await?;
        info!("Created VIP {} on port {}", vip.id, vip.protocol_port);
        Ok(vip)
    }

    async fn get_vip(&self, id: &str) -> Result<Vip> {
        self.rest.get(&format!("{}/{}", LB_VIPS, id), "vip").await
    }

    async fn list_vips(&self) -> Result<Vec<Vip>> {
        self.rest.get(LB_VIPS, "vips").await
    }

    async fn delete_vip(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("{}/{}", LB_VIPS, id)).await
    }

    async fn create_health_monitor(&self, request: &HealthMonitorCreate) -> Result<HealthMonitor> {
        let monitor: HealthMonitor = self
            .rest
            .post(LB_HEALTH_MONITORS, "health_monitor", request)
            .await?;
        info!("Created {:?} health monitor {}", monitor.kind, monitor.id);
        Ok(monitor)
    }

    async fn delete_health_monitor(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("{}/{}", LB_HEALTH_MONITORS, id)).await
    }

    async fn associate_health_monitor(&self, pool_id: &str, monitor_id: &str) -> Result<()> {
        self.rest
            .post_unit(
                &format!("{}/{}/health_monitors", LB_POOLS, pool_id),
                "health_monitor",
                &MonitorRef { id: monitor_id },
            )
            .await
    }

    async fn disassociate_health_monitor(&self, pool_id: &str, monitor_id: &str) -> Result<()> {
        self.rest
            .delete(&format!("{}/{}/health_monitors/{}", LB_POOLS, pool_id, monitor_id))
            .await
    }

    async fn create_floating_ip(&self, request: &FloatingIpCreate) -> Result<FloatingIp> {
        let floating_ip: FloatingIp = self.rest.post("v2.0/floatingips", "floatingip", request).await?;
        info!(
            "Created floating IP {} for port {}",
            floating_ip.floating_ip_address, request.port_id
        );
        Ok(floating_ip)
    }

    async fn delete_floating_ip(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("v2.0/floatingips/{}", id)).await
    }
}
