// src/load_balancer/placement.rs
use std::collections::BTreeSet;

/// A server that hosts backend listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendServer {
    pub server_id: String,
    pub address: String,
}

/// One pool member to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTarget {
    pub address: String,
    pub port: u16,
}

/// Decide which members the pool gets.
///
/// A single distinct server stands in for several backends by listening on
/// every port in `ports`; with two or more distinct servers each one gets a
/// single member on the first port. Repeated server ids count once.
pub fn plan_members(servers: &[BackendServer], ports: &[u16]) -> Vec<MemberTarget> {
    let mut seen = BTreeSet::new();
    let distinct: Vec<&BackendServer> = servers
        .iter()
        .filter(|s| seen.insert(s.server_id.as_str()))
        .collect();

    match (distinct.as_slice(), ports.first()) {
        (_, None) | ([], _) => Vec::new(),
        ([only], _) => ports
            .iter()
            .map(|&port| MemberTarget {
                address: only.address.clone(),
                port,
            })
            .collect(),
        (many, Some(&first)) => many
            .iter()
            .map(|s| MemberTarget {
                address: s.address.clone(),
                port: first,
            })
            .collect(),
    }
}
