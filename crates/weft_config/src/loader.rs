//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::FlowConfig;
use std::path::Path;

/// File name of the flow configuration inside a project directory.
pub const CONFIG_FILE_NAME: &str = "weft.toml";

/// Loads and validates a `weft.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<FlowConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<FlowConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `weft.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<FlowConfig, ConfigError> {
    let config: FlowConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are usable.
fn validate_config(config: &FlowConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.netlist.is_empty() {
        return Err(ConfigError::MissingField("project.netlist".to_string()));
    }
    if config.project.fabric.is_empty() {
        return Err(ConfigError::MissingField("project.fabric".to_string()));
    }
    if config.placement.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "placement.max_attempts must be at least 1".to_string(),
        ));
    }
    let penalty = config.routing.hop_penalty;
    if !penalty.is_finite() || penalty < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "routing.hop_penalty must be a finite non-negative number, got {penalty}"
        )));
    }
    if config.clock.net.is_empty() {
        return Err(ConfigError::MissingField("clock.net".to_string()));
    }
    for (port, assignment) in &config.pins {
        if assignment.pin.is_empty() {
            return Err(ConfigError::MissingField(format!("pins.{port}.pin")));
        }
    }
    Ok(())
}
