// src/scenario/driver.rs
use super::context::ScenarioContext;
use super::ledger::TeardownSummary;
use super::outcome::{ScenarioOutcome, ScenarioReport, Stage};
use super::topology::{self, ServerSpec};
use crate::backend::listener_commands;
use crate::clients::{ComputeApi, HttpProbe, NetworkApi, RemoteShell, SshTarget};
use crate::config::Config;
use crate::error::{Result, ScenarioError};
use crate::load_balancer::{BackendServer, HealthMonitorSpec, LoadBalancerProvisioner, ProvisionSettings};
use crate::poll::ResourceStatusPoller;
use crate::traffic::TrafficVerifier;
use chrono::Utc;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const LBAAS_EXTENSION: &str = "lbaas";

/// External services the scenario talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub compute: Arc<dyn ComputeApi>,
    pub network: Arc<dyn NetworkApi>,
    pub shell: Arc<dyn RemoteShell>,
    pub probe: Arc<dyn HttpProbe>,
}

/// Runs the basic load-balancing scenario end to end:
///
/// 1. security group, keypair and a server on the tenant network
/// 2. two labelled listeners on the server, started over SSH
/// 3. ROUND_ROBIN pool with one member per listener, a VIP waited to
///    ACTIVE and a floating IP on the VIP port
/// 4. `sample_count` requests through the VIP, split exactly evenly
///
/// A failing stage stops the run; whatever was created is deleted again.
pub struct ScenarioDriver {
    config: Config,
    tenant_id: String,
    clients: Collaborators,
    poller: ResourceStatusPoller,
}

impl ScenarioDriver {
    pub fn new(config: Config, tenant_id: impl Into<String>, clients: Collaborators) -> Self {
        let poller = ResourceStatusPoller::new(config.scenario.poll_interval());
        Self {
            config,
            tenant_id: tenant_id.into(),
            clients,
            poller,
        }
    }

    pub fn name(&self) -> String {
        format!("LoadBalancerBasic[{}]", self.config.scenario.interface)
    }

    /// `Some(reason)` when the environment cannot run the scenario.
    pub async fn check_preconditions(&self) -> Result<Option<String>> {
        if !self.clients.network.extension_enabled(LBAAS_EXTENSION).await? {
            return Ok(Some("LBaaS extension is not enabled".to_string()));
        }

        let network = &self.config.network;
        if !(network.tenant_networks_reachable || network.public_network().is_some()) {
            return Ok(Some(
                "either tenant_networks_reachable must be true, or public_network_id must be defined"
                    .to_string(),
            ));
        }

        Ok(None)
    }

    pub async fn run(&self) -> ScenarioReport {
        let run_id = Uuid::new_v4();
        let name = self.name();
        let span = info_span!("scenario", %run_id, %name);

        async move {
            let started_at = Utc::now();
            let mut ctx = ScenarioContext::new(run_id);

            let (outcome, teardown) = match self.check_preconditions().await {
                Ok(Some(reason)) => {
                    info!("Skipping: {}", reason);
                    (ScenarioOutcome::Skipped { reason }, TeardownSummary::default())
                }
                Err(error) => (
                    ScenarioOutcome::Failed {
                        stage: Stage::Preconditions,
                        error,
                    },
                    TeardownSummary::default(),
                ),
                Ok(None) => {
                    let outcome = match self.run_stages(&mut ctx).await {
                        Ok(()) => ScenarioOutcome::Passed,
                        Err((stage, error)) => {
                            error!("Stage {} failed: {}", stage, error);
                            ScenarioOutcome::Failed { stage, error }
                        }
                    };
                    let teardown = self.teardown(&mut ctx).await;
                    (outcome, teardown)
                }
            };

            info!("Scenario {}", outcome);
            ScenarioReport {
                name,
                run_id,
                started_at,
                finished_at: Utc::now(),
                outcome,
                provisioned: ctx.provisioned,
                distribution: ctx.distribution,
                teardown,
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, ctx: &mut ScenarioContext) -> Result<(), (Stage, ScenarioError)> {
        self.create_security_groups(ctx).await.map_err(at(Stage::SecurityGroups))?;
        self.create_server(ctx).await.map_err(at(Stage::Server))?;
        self.start_backends(ctx).await.map_err(at(Stage::Backends))?;
        self.create_load_balancer(ctx).await.map_err(at(Stage::LoadBalancer))?;
        self.check_load_balancing(ctx).await.map_err(at(Stage::Traffic))?;
        Ok(())
    }

    async fn create_security_groups(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let group = topology::create_security_group(
            self.clients.network.as_ref(),
            &mut ctx.ledger,
            &self.config.scenario.ports,
        )
        .await?;
        ctx.security_group = Some(group);
        Ok(())
    }

    async fn create_server(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let network = topology::tenant_network(self.clients.network.as_ref(), &self.tenant_id).await?;
        let security_group = ctx
            .security_group
            .as_ref()
            .ok_or_else(|| ScenarioError::missing("security group"))?;

        let (keypair, server) = topology::boot_server(
            self.clients.compute.as_ref(),
            &self.poller,
            &mut ctx.ledger,
            ServerSpec {
                image_ref: &self.config.compute.image_ref,
                flavor_ref: &self.config.compute.flavor_ref,
                security_group,
                network: &network,
                build_timeout: self.config.compute.build_timeout(),
            },
        )
        .await?;

        ctx.keypair = Some(keypair);
        ctx.network = Some(network);
        ctx.servers.push(server);
        Ok(())
    }

    async fn start_backends(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let scenario = &self.config.scenario;
        let commands = listener_commands(&scenario.labels, &scenario.ports);
        let private_key = ctx
            .keypair
            .as_ref()
            .and_then(|k| k.private_key.clone())
            .ok_or_else(|| ScenarioError::missing("keypair private key"))?;

        for server in &self.backend_servers(ctx)? {
            let host: IpAddr = server.address.parse().map_err(|_| {
                ScenarioError::Ssh(format!("server {} has no usable address: {}", server.server_id, server.address))
            })?;
            let target = SshTarget {
                host,
                port: 22,
                user: self.config.compute.image_ssh_user.clone(),
                private_key: private_key.clone(),
                timeout: self.config.compute.ssh_timeout(),
            };
            self.clients.shell.run_detached(&target, &commands).await?;
            info!("Started {} backend listener(s) on {}", commands.len(), host);
        }
        Ok(())
    }

    async fn create_load_balancer(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let provisioner = LoadBalancerProvisioner::new(
            self.clients.network.clone(),
            self.poller,
            ProvisionSettings {
                tenant_id: self.tenant_id.clone(),
                vip_timeout: self.config.scenario.vip_status_timeout(),
                public_network_id: self.config.network.public_network().map(str::to_string),
                health_monitor: self
                    .config
                    .scenario
                    .health_monitor
                    .then(HealthMonitorSpec::default),
            },
        );

        let servers = self.backend_servers(ctx)?;
        let provisioned = provisioner
            .provision(&mut ctx.ledger, &servers, &self.config.scenario.ports)
            .await?;
        ctx.provisioned = Some(provisioned);
        Ok(())
    }

    async fn check_load_balancing(&self, ctx: &mut ScenarioContext) -> Result<()> {
        let address = ctx
            .provisioned
            .as_ref()
            .map(|p| p.address().to_string())
            .ok_or_else(|| ScenarioError::missing("provisioned load balancer"))?;

        let verifier = TrafficVerifier::new(
            self.clients.probe.clone(),
            self.config.compute.ping_timeout(),
            self.config.scenario.poll_interval(),
        );
        let report = verifier
            .verify_distribution(
                &address,
                self.config.scenario.sample_count,
                &self.config.scenario.labels,
            )
            .await?;
        ctx.distribution = Some(report);
        Ok(())
    }

    fn backend_servers(&self, ctx: &ScenarioContext) -> Result<Vec<BackendServer>> {
        let network = ctx
            .network
            .as_ref()
            .ok_or_else(|| ScenarioError::missing("tenant network"))?;

        ctx.servers
            .iter()
            .map(|server| {
                let address = server
                    .address_on(&network.name)
                    .ok_or_else(|| ScenarioError::missing(format!("address of server {} on {}", server.id, network.name)))?;
                Ok(BackendServer {
                    server_id: server.id.clone(),
                    address: address.to_string(),
                })
            })
            .collect()
    }

    async fn teardown(&self, ctx: &mut ScenarioContext) -> TeardownSummary {
        ctx.ledger
            .teardown(
                self.clients.compute.as_ref(),
                self.clients.network.as_ref(),
                self.config.compute.build_timeout(),
                self.config.scenario.poll_interval(),
            )
            .await
    }
}

fn at(stage: Stage) -> impl FnOnce(ScenarioError) -> (Stage, ScenarioError) {
    move |error| (stage, error)
}
