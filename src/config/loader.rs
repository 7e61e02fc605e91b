//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// A relative `routing.resource_dir` is resolved against the directory of
/// the config file.
pub fn load_config(path: &Path) -> Result<GateConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: GateConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    let resource_dir = Path::new(&config.routing.resource_dir);
    if resource_dir.is_relative() {
        if let Some(parent) = path.parent() {
            config.routing.resource_dir = parent.join(resource_dir).to_string_lossy().into_owned();
        }
    }

    Ok(config)
}
