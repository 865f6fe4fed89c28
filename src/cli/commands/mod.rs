//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Resolves the stage and builds the injected store client
//! 3. Calls the library to do the work
//! 4. Formats and displays output
//!
//! Handlers never talk to the table service directly; everything flows
//! through the store, share, and lifecycle layers.

mod bootstrap;
mod completion;
mod describe;
mod get;
mod publish;

pub use bootstrap::bootstrap;
pub use completion::completion;
pub use describe::describe;
pub use get::get;
pub use publish::publish;

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::identity::{StageDescriptor, StoreIdentity};
use crate::core::types::StageName;
use crate::store::{self, ConfigStore};

/// Everything a stage-addressed command needs.
pub(crate) struct StageContext {
    pub stage: StageDescriptor,
    pub identity: StoreIdentity,
    pub store: Box<dyn ConfigStore>,
}

/// Resolve the project config and build the store client for a stage.
pub(crate) fn stage_context(project_dir: &Path, stage: &str) -> Result<StageContext> {
    let stage_name = StageName::new(stage)?;
    let config = Config::load(Some(project_dir))
        .with_context(|| format!("loading config from '{}'", project_dir.display()))?;
    let descriptor = config.resolve_stage(&stage_name)?;
    let prefix = config
        .prefix()
        .expect("project config was loaded, prefix is present")
        .to_string();
    let identity = descriptor.store_identity(&prefix);
    let store = store::for_stage(&prefix, &descriptor);
    Ok(StageContext {
        stage: descriptor,
        identity,
        store,
    })
}
