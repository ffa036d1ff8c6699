// src/clients/mod.rs
//! Collaborators the scenario drives: compute, network, remote shell and
//! HTTP probe. Each is a trait so the workflow can run against fakes.
mod compute;
mod identity;
mod network;
mod probe;
mod rest;
mod ssh;
pub mod types;

pub use compute::ComputeClient;
pub use identity::{authenticate, Credentials};
pub use network::NetworkClient;
pub use probe::ReqwestProbe;
pub use rest::{http_client, RestClient};
pub use ssh::SshShell;

use crate::error::Result;
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use types::*;
use url::Url;

#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn create_keypair(&self, name: &str) -> Result<Keypair>;
    async fn delete_keypair(&self, name: &str) -> Result<()>;
    async fn create_server(&self, request: &ServerCreate) -> Result<Server>;
    async fn get_server(&self, id: &str) -> Result<Server>;
    async fn delete_server(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn list_extensions(&self) -> Result<Vec<Extension>>;

    async fn extension_enabled(&self, alias: &str) -> Result<bool> {
        Ok(self
            .list_extensions()
            .await?
            .iter()
            .any(|ext| ext.alias == alias))
    }

    async fn list_networks(&self, tenant_id: &str) -> Result<Vec<Network>>;
    async fn list_subnets(&self, tenant_id: &str) -> Result<Vec<Subnet>>;

    async fn create_security_group(&self, request: &SecurityGroupCreate) -> Result<SecurityGroup>;
    async fn create_security_group_rule(
        &self,
        request: &SecurityGroupRuleCreate,
    ) -> Result<SecurityGroupRule>;
    async fn delete_security_group(&self, id: &str) -> Result<()>;

    async fn create_pool(&self, request: &PoolCreate) -> Result<Pool>;
    async fn get_pool(&self, id: &str) -> Result<Pool>;
    async fn list_pools(&self) -> Result<Vec<Pool>>;
    async fn delete_pool(&self, id: &str) -> Result<()>;

    async fn create_member(&self, request: &MemberCreate) -> Result<Member>;
    async fn delete_member(&self, id: &str) -> Result<()>;

    async fn create_vip(&self, request: &VipCreate) -> Result<Vip>;
    async fn get_vip(&self, id: &str) -> Result<Vip>;
    async fn list_vips(&self) -> Result<Vec<Vip>>;
    async fn delete_vip(&self, id: &str) -> Result<()>;

    async fn create_health_monitor(&self, request: &HealthMonitorCreate) -> Result<HealthMonitor>;
    async fn delete_health_monitor(&self, id: &str) -> Result<()>;
    async fn associate_health_monitor(&self, pool_id: &str, monitor_id: &str) -> Result<()>;
    async fn disassociate_health_monitor(&self, pool_id: &str, monitor_id: &str) -> Result<()>;

    async fn create_floating_ip(&self, request: &FloatingIpCreate) -> Result<FloatingIp>;
    async fn delete_floating_ip(&self, id: &str) -> Result<()>;
}

/// Where and as whom to open a remote shell.
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: IpAddr,
    pub port: u16,
    pub user: String,
    /// PEM-encoded private key.
    pub private_key: String,
    /// Bound on connection attempts while the server finishes booting.
    pub timeout: Duration,
}

#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run each command in turn; long-running commands are expected to
    /// background themselves.
    async fn run_detached(&self, target: &SshTarget, commands: &[String]) -> Result<()>;
}

#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get_text(&self, url: &Url) -> Result<String>;
}
