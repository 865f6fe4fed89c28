//! core::config::schema
//!
//! Tool configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$CROSSWIRE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/crosswire/config.toml`
//! 3. `~/.crosswire/config.toml`
//!
//! # Project Config
//!
//! Located at `<project dir>/crosswire.toml`. Declares the project prefix
//! and one `[stage.<name>]` table per deployment stage.
//!
//! # Validation
//!
//! Config values are validated after parsing: the prefix and stage names
//! must survive the same naming rules that feed store identities, and
//! every stage must end up with an endpoint once global defaults are
//! applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::StageName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// default_endpoint = "https://tables.example.com"
/// default_token_env = "CROSSWIRE_TOKEN"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Endpoint used by stages that do not declare their own.
    pub default_endpoint: Option<String>,

    /// Token variable used by stages that do not declare their own.
    pub default_token_env: Option<String>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = &self.default_endpoint {
            validate_endpoint(endpoint)?;
        }
        Ok(())
    }
}

/// Project configuration (`crosswire.toml`).
///
/// # Example
///
/// ```toml
/// [project]
/// prefix = "acme"
/// description = "Acme data platform"
///
/// [stage.dev]
/// account = "123456789012"
/// region = "us-east-1"
/// endpoint = "https://tables.dev.example.com"
/// token_env = "CROSSWIRE_DEV_TOKEN"
///
/// [stage.prod]
/// account = "210987654321"
/// region = "us-east-1"
/// endpoint = "https://tables.prod.example.com"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// The project section.
    pub project: ProjectSection,

    /// One table per stage.
    #[serde(default, rename = "stage")]
    pub stages: BTreeMap<String, StageTargetConfig>,
}

/// The `[project]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Prefix for all derived store identities.
    pub prefix: String,

    /// Optional project description.
    #[serde(default)]
    pub description: Option<String>,
}

/// One `[stage.<name>]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StageTargetConfig {
    /// Account identifier within the hosting platform.
    pub account: String,

    /// Region the stage's resources live in.
    pub region: String,

    /// Table-service endpoint; falls back to the global default.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Token variable; falls back to the global default.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl ProjectConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the prefix or a stage
    /// name violates the store naming rules, or a declared endpoint is
    /// malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_prefix(&self.project.prefix)?;
        for (name, stage) in &self.stages {
            StageName::new(name.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid stage '{name}': {e}"))
            })?;
            if stage.account.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "stage '{name}' has an empty account"
                )));
            }
            if stage.region.is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "stage '{name}' has an empty region"
                )));
            }
            if let Some(endpoint) = &stage.endpoint {
                validate_endpoint(endpoint)?;
            }
        }
        Ok(())
    }
}

/// Prefixes obey the same rules as stage names: they feed the same
/// derived table names.
fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    StageName::new(prefix)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid project prefix: {e}")))
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    url::Url::parse(endpoint)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("invalid endpoint '{endpoint}': {e}")))
}
