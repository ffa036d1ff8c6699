// src/scenario/mod.rs
mod context;
mod driver;
mod ledger;
mod outcome;
pub mod topology;

pub use context::ScenarioContext;
pub use driver::{Collaborators, ScenarioDriver, LBAAS_EXTENSION};
pub use ledger::{CreatedResource, ResourceLedger, TeardownSummary};
pub use outcome::{ScenarioOutcome, ScenarioReport, Stage};
