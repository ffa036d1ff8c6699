// src/error.rs
use std::collections::BTreeMap;
use std::time::Duration;

pub type Result<T, E = ScenarioError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("timed out after {elapsed:?} waiting for {resource}")]
    Timeout { resource: String, elapsed: Duration },

    #[error("{resource} went to {status} while waiting for {expected}")]
    ResourceFailed {
        resource: String,
        status: String,
        expected: String,
    },

    #[error("tenant {tenant_id} must own exactly one subnet, found {found}")]
    AmbiguousSubnet { tenant_id: String, found: usize },

    #[error("traffic distribution mismatch over {samples} samples: expected {expected:?}, got {actual:?}")]
    Distribution {
        samples: usize,
        expected: BTreeMap<String, usize>,
        actual: BTreeMap<String, usize>,
    },

    #[error("{resource} is not registered as created: {detail}")]
    Registration { resource: String, detail: String },

    #[error("cannot split {samples} samples evenly over {backends} backends")]
    InvalidDistribution { samples: usize, backends: usize },

    #[error("{method} {url} returned {status}: {body}")]
    Api {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("missing {what} in API response")]
    MissingField { what: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<russh::Error> for ScenarioError {
    fn from(err: russh::Error) -> Self {
        ScenarioError::Ssh(err.to_string())
    }
}

impl From<russh_keys::Error> for ScenarioError {
    fn from(err: russh_keys::Error) -> Self {
        ScenarioError::Ssh(err.to_string())
    }
}

impl From<config::ConfigError> for ScenarioError {
    fn from(err: config::ConfigError) -> Self {
        ScenarioError::Config(err.to_string())
    }
}

impl ScenarioError {
    pub fn missing(what: impl Into<String>) -> Self {
        ScenarioError::MissingField { what: what.into() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScenarioError::Timeout { .. })
    }
}
