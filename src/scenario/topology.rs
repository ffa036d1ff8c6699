// src/scenario/topology.rs
//! Security group, keypair and server for the backends.
use super::ledger::{CreatedResource, ResourceLedger};
use crate::clients::types::{
    Keypair, Network, NetworkRef, ResourceStatus, SecurityGroup, SecurityGroupCreate, SecurityGroupRef,
    SecurityGroupRuleCreate, Server, ServerCreate,
};
use crate::clients::{ComputeApi, NetworkApi};
use crate::error::{Result, ScenarioError};
use crate::names::rand_name;
use crate::poll::{ResourceStatusPoller, ServerStatus};
use std::time::Duration;
use tracing::info;

const SSH_PORT: u16 = 22;

/// Security group admitting SSH, ICMP and the backend ports.
pub async fn create_security_group(
    network: &dyn NetworkApi,
    ledger: &mut ResourceLedger,
    backend_ports: &[u16],
) -> Result<SecurityGroup> {
    let group = network
        .create_security_group(&SecurityGroupCreate {
            name: rand_name("secgroup-smoke-"),
            description: "load balancer scenario".to_string(),
        })
        .await?;
    ledger.record(CreatedResource::SecurityGroup(group.id.clone()));

    let mut rules = vec![
        SecurityGroupRuleCreate::ingress_tcp(&group.id, SSH_PORT),
        SecurityGroupRuleCreate::ingress_icmp(&group.id),
    ];
    rules.extend(
        backend_ports
            .iter()
            .map(|&port| SecurityGroupRuleCreate::ingress_tcp(&group.id, port)),
    );

    for rule in &rules {
        network.create_security_group_rule(rule).await?;
    }

    info!("Security group {} admits {} rule(s)", group.name, rules.len());
    Ok(group)
}

/// The tenant's first network; the server attaches to it.
pub async fn tenant_network(network: &dyn NetworkApi, tenant_id: &str) -> Result<Network> {
    network
        .list_networks(tenant_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ScenarioError::missing(format!("network for tenant {}", tenant_id)))
}

pub struct ServerSpec<'a> {
    pub image_ref: &'a str,
    pub flavor_ref: &'a str,
    pub security_group: &'a SecurityGroup,
    pub network: &'a Network,
    pub build_timeout: Duration,
}

/// Keypair plus a server booted with it, waited to ACTIVE.
pub async fn boot_server(
    compute: &dyn ComputeApi,
    poller: &ResourceStatusPoller,
    ledger: &mut ResourceLedger,
    spec: ServerSpec<'_>,
) -> Result<(Keypair, Server)> {
    let name = rand_name("smoke_server-");

    let keypair = compute.create_keypair(&format!("keypair-{}", name)).await?;
    ledger.record(CreatedResource::Keypair(keypair.name.clone()));

    let created = compute
        .create_server(&ServerCreate {
            name: name.clone(),
            image_ref: spec.image_ref.to_string(),
            flavor_ref: spec.flavor_ref.to_string(),
            key_name: keypair.name.clone(),
            security_groups: vec![SecurityGroupRef {
                name: spec.security_group.name.clone(),
            }],
            networks: vec![NetworkRef {
                uuid: spec.network.id.clone(),
            }],
        })
        .await?;
    ledger.record(CreatedResource::Server(created.id.clone()));

    poller
        .wait_for_status(
            &ServerStatus(compute),
            &created.id,
            &ResourceStatus::Active,
            spec.build_timeout,
        )
        .await?;

    // Addresses are only filled in once the server is up.
    let server = compute.get_server(&created.id).await?;
    info!(
        "Server {} is ACTIVE at {:?}",
        server.id,
        server.address_on(&spec.network.name)
    );
    Ok((keypair, server))
}
