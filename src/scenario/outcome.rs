// src/scenario/outcome.rs
use super::ledger::TeardownSummary;
use crate::error::ScenarioError;
use crate::load_balancer::Provisioned;
use crate::traffic::DistributionReport;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preconditions,
    SecurityGroups,
    Server,
    Backends,
    LoadBalancer,
    Traffic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preconditions => "preconditions",
            Stage::SecurityGroups => "security groups",
            Stage::Server => "server",
            Stage::Backends => "backends",
            Stage::LoadBalancer => "load balancer",
            Stage::Traffic => "traffic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed,
    Failed {
        stage: Stage,
        #[serde(serialize_with = "serialize_error")]
        error: ScenarioError,
    },
    Skipped {
        reason: String,
    },
}

fn serialize_error<S: Serializer>(error: &ScenarioError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

impl ScenarioOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScenarioOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ScenarioOutcome::Skipped { .. })
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioOutcome::Passed => write!(f, "passed"),
            ScenarioOutcome::Failed { stage, error } => write!(f, "failed in {} stage: {}", stage, error),
            ScenarioOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: ScenarioOutcome,
    pub provisioned: Option<Provisioned>,
    pub distribution: Option<DistributionReport>,
    pub teardown: TeardownSummary,
}
