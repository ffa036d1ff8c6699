// src/load_balancer/mod.rs
mod algorithm;
mod placement;
mod provisioner;

pub use algorithm::{HealthMonitorSpec, HealthMonitorType, LbMethod, Protocol};
pub use placement::{plan_members, BackendServer, MemberTarget};
pub use provisioner::{LoadBalancerProvisioner, ProvisionSettings, Provisioned, VIP_PORT};
