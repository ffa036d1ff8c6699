// src/config/models.rs
use crate::error::{Result, ScenarioError};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub auth_url: Url,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub tenant_name: String,
    /// Pre-issued token; Keystone is skipped when this and `tenant_id` are set.
    #[serde(default, deserialize_with = "non_empty")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub compute_url: Url,
    pub network_url: Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeConfig {
    #[serde(default)]
    pub image_ref: String,
    #[serde(default)]
    pub flavor_ref: String,
    #[serde(default = "default_ssh_user")]
    pub image_ssh_user: String,
    #[serde(default = "default_ssh_timeout")]
    pub ssh_timeout_secs: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_secs: u64,
    #[serde(default = "default_build_timeout")]
    pub build_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// An empty id counts as unset.
    #[serde(default, deserialize_with = "non_empty")]
    pub public_network_id: Option<String>,
    #[serde(default)]
    pub tenant_networks_reachable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub interface: Interface,
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
    #[serde(default = "default_vip_timeout")]
    pub vip_status_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_true")]
    pub health_monitor: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    #[default]
    Json,
    Xml,
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interface::Json => f.write_str("json"),
            Interface::Xml => f.write_str("xml"),
        }
    }
}

/// Longest accepted timeout for any wait, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// Default value functions
fn default_ssh_user() -> String {
    "cirros".to_string()
}

fn default_ssh_timeout() -> u64 {
    100
}

fn default_ping_timeout() -> u64 {
    120
}

fn default_build_timeout() -> u64 {
    300
}

fn default_sample_count() -> usize {
    10
}

fn default_labels() -> Vec<String> {
    vec!["server1".to_string(), "server2".to_string()]
}

fn default_ports() -> Vec<u16> {
    vec![80, 88]
}

fn default_vip_timeout() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            image_ref: String::new(),
            flavor_ref: String::new(),
            image_ssh_user: default_ssh_user(),
            ssh_timeout_secs: default_ssh_timeout(),
            ping_timeout_secs: default_ping_timeout(),
            build_timeout_secs: default_build_timeout(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            interface: Interface::default(),
            sample_count: default_sample_count(),
            labels: default_labels(),
            ports: default_ports(),
            vip_status_timeout_secs: default_vip_timeout(),
            poll_interval_ms: default_poll_interval(),
            health_monitor: true,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ComputeConfig {
    pub fn ssh_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh_timeout_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }
}

impl NetworkConfig {
    /// Configured public network id, ignoring blank values.
    pub fn public_network(&self) -> Option<&str> {
        self.public_network_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

impl ScenarioConfig {
    pub fn vip_status_timeout(&self) -> Duration {
        Duration::from_secs(self.vip_status_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let scenario = &self.scenario;

        if scenario.interface == Interface::Xml {
            return Err(ScenarioError::Config(
                "the xml interface is not supported, use json".to_string(),
            ));
        }

        if scenario.labels.is_empty() {
            return Err(ScenarioError::Config(
                "at least one backend label must be configured".to_string(),
            ));
        }

        if scenario.labels.len() != scenario.ports.len() {
            return Err(ScenarioError::Config(format!(
                "{} labels configured for {} ports",
                scenario.labels.len(),
                scenario.ports.len()
            )));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(duplicate) = scenario.labels.iter().find(|label| !seen.insert(label.as_str())) {
            return Err(ScenarioError::Config(format!(
                "backend label {:?} is configured more than once",
                duplicate
            )));
        }

        if scenario.sample_count == 0 || scenario.sample_count % scenario.labels.len() != 0 {
            return Err(ScenarioError::Config(format!(
                "sample_count {} must be a positive multiple of {}",
                scenario.sample_count,
                scenario.labels.len()
            )));
        }

        if scenario.poll_interval_ms == 0 {
            return Err(ScenarioError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        let timeouts = [
            ("compute.ssh_timeout_secs", self.compute.ssh_timeout_secs),
            ("compute.ping_timeout_secs", self.compute.ping_timeout_secs),
            ("compute.build_timeout_secs", self.compute.build_timeout_secs),
            ("scenario.vip_status_timeout_secs", scenario.vip_status_timeout_secs),
            ("scenario.request_timeout_secs", scenario.request_timeout_secs),
        ];
        for (key, secs) in timeouts {
            if secs > MAX_TIMEOUT_SECS {
                return Err(ScenarioError::Config(format!(
                    "{} is {}, at most {} is accepted",
                    key, secs, MAX_TIMEOUT_SECS
                )));
            }
        }
        if scenario.poll_interval_ms / 1000 > MAX_TIMEOUT_SECS {
            return Err(ScenarioError::Config(format!(
                "poll_interval_ms is {}, at most {} seconds is accepted",
                scenario.poll_interval_ms, MAX_TIMEOUT_SECS
            )));
        }

        let has_token = self.identity.token.is_some() && self.identity.tenant_id.is_some();
        if !has_token && (self.identity.username.is_empty() || self.identity.tenant_name.is_empty()) {
            return Err(ScenarioError::Config(
                "identity needs either token + tenant_id or username + tenant_name".to_string(),
            ));
        }

        Ok(())
    }
}
