//! core::config
//!
//! Tool configuration: the stage/target resolver.
//!
//! # Overview
//!
//! Crosswire has two configuration scopes:
//! - **Global**: user-level defaults (endpoint, token variable)
//! - **Project**: the project prefix and its stage targets
//!
//! # Precedence
//!
//! Stage targets come from the project file; where a stage omits its
//! endpoint or token variable, the global default fills in.
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$CROSSWIRE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/crosswire/config.toml`
//! 3. `~/.crosswire/config.toml`
//!
//! # Project Config Location
//!
//! `<project dir>/crosswire.toml`
//!
//! # Example
//!
//! ```no_run
//! use crosswire::core::config::Config;
//! use crosswire::core::types::StageName;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let stage = StageName::new("dev").unwrap();
//! let descriptor = config.resolve_stage(&stage).unwrap();
//! println!("endpoint: {}", descriptor.target.endpoint);
//! ```

pub mod schema;

pub use schema::{GlobalConfig, ProjectConfig, StageTargetConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::identity::{StageDescriptor, TargetIdentity};
use crate::core::types::StageName;

/// File name of the project configuration.
pub const PROJECT_CONFIG_FILE: &str = "crosswire.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("no project config found at '{0}'")]
    NoProjectConfig(PathBuf),

    #[error("stage '{stage}' is not declared in the project config (declared: {declared})")]
    UnknownStage { stage: StageName, declared: String },

    #[error("stage '{stage}' has no endpoint and no global default endpoint is set")]
    NoEndpoint { stage: StageName },
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration.
    pub global: GlobalConfig,
    /// Project configuration (if a project dir was given).
    pub project: Option<ProjectConfig>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, the project config must exist there.
    /// A missing global config is not an error (defaults are used); a
    /// missing project config is, because nothing else can supply the
    /// prefix and stage targets.
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let global = Self::load_global()?;

        let project = match project_dir {
            Some(dir) => Some(Self::load_project(dir)?),
            None => None,
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(Config { global, project })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<GlobalConfig, ConfigError> {
        if let Ok(path) = std::env::var("CROSSWIRE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::read_toml(&path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("crosswire/config.toml");
            if path.exists() {
                return Self::read_toml(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".crosswire/config.toml");
            if path.exists() {
                return Self::read_toml(&path);
            }
        }

        Ok(GlobalConfig::default())
    }

    /// Load the project configuration from a directory.
    fn load_project(dir: &Path) -> Result<ProjectConfig, ConfigError> {
        let path = dir.join(PROJECT_CONFIG_FILE);
        if !path.exists() {
            return Err(ConfigError::NoProjectConfig(path));
        }
        Self::read_toml(&path)
    }

    fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The project prefix, if a project config was loaded.
    pub fn prefix(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.project.prefix.as_str())
    }

    /// Resolve a stage into its deployment target.
    ///
    /// Applies global defaults for endpoint and token variable where the
    /// stage omits them.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownStage`] when the stage is not declared
    /// - [`ConfigError::NoEndpoint`] when neither the stage nor the
    ///   global config supplies an endpoint
    pub fn resolve_stage(&self, stage: &StageName) -> Result<StageDescriptor, ConfigError> {
        let project = self
            .project
            .as_ref()
            .ok_or_else(|| ConfigError::NoProjectConfig(PathBuf::from(PROJECT_CONFIG_FILE)))?;

        let target = project.stages.get(stage.as_str()).ok_or_else(|| {
            ConfigError::UnknownStage {
                stage: stage.clone(),
                declared: project
                    .stages
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })?;

        let endpoint = target
            .endpoint
            .clone()
            .or_else(|| self.global.default_endpoint.clone())
            .ok_or_else(|| ConfigError::NoEndpoint {
                stage: stage.clone(),
            })?;
        let token_env = target
            .token_env
            .clone()
            .or_else(|| self.global.default_token_env.clone());

        Ok(StageDescriptor {
            name: stage.clone(),
            target: TargetIdentity {
                account: target.account.clone(),
                region: target.region.clone(),
                endpoint,
                token_env,
            },
        })
    }
}
