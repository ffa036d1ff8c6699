// src/clients/types.rs
//! Wire records for the compute and network APIs.
//!
//! Only the fields the scenario reads are modelled; everything else the API
//! returns is ignored on deserialization.
use crate::load_balancer::{HealthMonitorType, LbMethod, Protocol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status field shared by servers and LBaaS resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    Active,
    Build,
    PendingCreate,
    PendingUpdate,
    PendingDelete,
    Inactive,
    Error,
    Other(String),
}

impl ResourceStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, ResourceStatus::Error)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ResourceStatus::Active => "ACTIVE",
            ResourceStatus::Build => "BUILD",
            ResourceStatus::PendingCreate => "PENDING_CREATE",
            ResourceStatus::PendingUpdate => "PENDING_UPDATE",
            ResourceStatus::PendingDelete => "PENDING_DELETE",
            ResourceStatus::Inactive => "INACTIVE",
            ResourceStatus::Error => "ERROR",
            ResourceStatus::Other(s) => s,
        }
    }
}

impl From<String> for ResourceStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => ResourceStatus::Active,
            "BUILD" => ResourceStatus::Build,
            "PENDING_CREATE" => ResourceStatus::PendingCreate,
            "PENDING_UPDATE" => ResourceStatus::PendingUpdate,
            "PENDING_DELETE" => ResourceStatus::PendingDelete,
            "INACTIVE" => ResourceStatus::Inactive,
            "ERROR" => ResourceStatus::Error,
            _ => ResourceStatus::Other(s),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ResourceStatus {
    fn default() -> Self {
        ResourceStatus::Other(String::new())
    }
}

// ─── Compute ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Keypair {
    pub name: String,
    #[serde(default)]
    pub public_key: String,
    /// Only present in the create response.
    #[serde(default)]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerAddress {
    pub addr: String,
    #[serde(default)]
    pub version: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
}

impl Server {
    /// First address the server holds on `network_name`.
    pub fn address_on(&self, network_name: &str) -> Option<&str> {
        self.addresses
            .get(network_name)
            .and_then(|addrs| addrs.first())
            .map(|a| a.addr.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkRef {
    pub uuid: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCreate {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    pub key_name: String,
    pub security_groups: Vec<SecurityGroupRef>,
    pub networks: Vec<NetworkRef>,
}

// ─── Network ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Extension {
    pub alias: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subnet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub cidr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupCreate {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityGroupRule {
    pub id: String,
    pub security_group_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupRuleCreate {
    pub security_group_id: String,
    pub direction: String,
    pub ethertype: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_min: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_max: Option<u16>,
    pub remote_ip_prefix: String,
}

impl SecurityGroupRuleCreate {
    pub fn ingress_tcp(security_group_id: &str, port: u16) -> Self {
        Self {
            security_group_id: security_group_id.to_string(),
            direction: "ingress".to_string(),
            ethertype: "IPv4".to_string(),
            protocol: "tcp".to_string(),
            port_range_min: Some(port),
            port_range_max: Some(port),
            remote_ip_prefix: "0.0.0.0/0".to_string(),
        }
    }

    pub fn ingress_icmp(security_group_id: &str) -> Self {
        Self {
            security_group_id: security_group_id.to_string(),
            direction: "ingress".to_string(),
            ethertype: "IPv4".to_string(),
            protocol: "icmp".to_string(),
            port_range_min: None,
            port_range_max: None,
            remote_ip_prefix: "0.0.0.0/0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pool {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub lb_method: LbMethod,
    pub protocol: Protocol,
    pub subnet_id: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub health_monitors: Vec<String>,
    /// Member ids.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub vip_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolCreate {
    pub name: String,
    pub lb_method: LbMethod,
    pub protocol: Protocol,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub id: String,
    pub address: String,
    pub protocol_port: u16,
    pub pool_id: String,
    #[serde(default)]
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberCreate {
    pub address: String,
    pub protocol_port: u16,
    pub pool_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vip {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub protocol: Protocol,
    pub protocol_port: u16,
    pub subnet_id: String,
    pub pool_id: String,
    #[serde(default)]
    pub port_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct VipCreate {
    pub name: String,
    pub protocol: Protocol,
    pub protocol_port: u16,
    pub subnet_id: String,
    pub pool_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthMonitor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HealthMonitorType,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthMonitorCreate {
    #[serde(rename = "type")]
    pub kind: HealthMonitorType,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub floating_ip_address: String,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub floating_network_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloatingIpCreate {
    pub floating_network_id: String,
    pub port_id: String,
}
