// src/load_balancer/algorithm.rs
use serde::{Deserialize, Serialize};

/// Balancing algorithm of an LBaaS pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LbMethod {
    RoundRobin,
    LeastConnections,
    SourceIp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthMonitorType {
    Ping,
    Tcp,
    Http,
    Https,
}

/// Health monitor attached to the scenario's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthMonitorSpec {
    pub kind: HealthMonitorType,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
}

impl Default for HealthMonitorSpec {
    fn default() -> Self {
        Self {
            kind: HealthMonitorType::Tcp,
            delay: 4,
            timeout: 1,
            max_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&LbMethod::RoundRobin).unwrap(), r#""ROUND_ROBIN""#);
        assert_eq!(serde_json::to_string(&LbMethod::SourceIp).unwrap(), r#""SOURCE_IP""#);
        assert_eq!(serde_json::to_string(&Protocol::Http).unwrap(), r#""HTTP""#);
        assert_eq!(serde_json::to_string(&HealthMonitorType::Tcp).unwrap(), r#""TCP""#);
    }
}
