// src/scenario/context.rs
use super::ledger::ResourceLedger;
use crate::clients::types::{Keypair, Network, SecurityGroup, Server};
use crate::load_balancer::Provisioned;
use crate::traffic::DistributionReport;
use uuid::Uuid;

/// State one scenario run builds up, handed from stage to stage.
#[derive(Debug)]
pub struct ScenarioContext {
    pub run_id: Uuid,
    pub ledger: ResourceLedger,
    pub security_group: Option<SecurityGroup>,
    pub keypair: Option<Keypair>,
    pub network: Option<Network>,
    pub servers: Vec<Server>,
    pub provisioned: Option<Provisioned>,
    pub distribution: Option<DistributionReport>,
}

impl ScenarioContext {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            ledger: ResourceLedger::new(),
            security_group: None,
            keypair: None,
            network: None,
            servers: Vec::new(),
            provisioned: None,
            distribution: None,
        }
    }
}
