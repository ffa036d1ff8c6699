// src/config/mod.rs
mod models;

pub use models::*;

use crate::error::{Result, ScenarioError};
use config::{Environment, File};
use std::path::Path;

pub use config::FileFormat;

/// Environment prefix for overrides, e.g. `LBAAS_SCENARIO_IDENTITY__PASSWORD`.
pub const ENV_PREFIX: &str = "LBAAS_SCENARIO";

/// Load configuration from a file (YAML or JSON), layered with environment overrides
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        ScenarioError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    let format = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        other => {
            return Err(ScenarioError::Config(format!(
                "unsupported config extension {:?}, expected yaml or json",
                other
            )))
        }
    };

    parse_config(&contents, format)
}

pub fn parse_config(contents: &str, format: FileFormat) -> Result<Config> {
    let config: Config = config::Config::builder()
        .add_source(File::from_str(contents, format))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}
