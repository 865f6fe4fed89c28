//! store
//!
//! Batched key-value persistence for stage-scoped configuration.
//!
//! # Architecture
//!
//! The [`ConfigStore`] trait is the single doorway to the backing table
//! service. Two implementations exist:
//!
//! - [`http::HttpStore`] - the production HTTP table-service client
//! - [`mock::MockStore`] - a deterministic in-memory double for tests
//!
//! The store a run addresses is fixed by its [`StoreIdentity`], derived
//! once from (project prefix, stage) and injected; nothing below this
//! layer guesses identities from the environment.
//!
//! [`StoreIdentity`]: crate::core::identity::StoreIdentity

pub mod http;
pub mod mock;
pub mod traits;

pub use traits::{
    ConfigKey, ConfigRecord, ConfigStore, StoreError, StoredValue, DEFAULT_READ_LIMIT,
    DEFAULT_WRITE_LIMIT,
};

use crate::core::identity::{StageDescriptor, StoreIdentity};

/// Build the production store client for a stage.
///
/// Derives the store identity from the project prefix and stage, reads
/// the bearer token from the environment variable the stage's target
/// names (if any), and returns a boxed [`ConfigStore`].
///
/// A missing token variable is not an error here; the store surfaces
/// `AuthRequired` if the service demands one.
pub fn for_stage(prefix: &str, stage: &StageDescriptor) -> Box<dyn ConfigStore> {
    let identity = StoreIdentity::derive(prefix, &stage.name);
    let token = stage
        .target
        .token_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok());
    Box::new(http::HttpStore::new(
        stage.target.endpoint.clone(),
        identity,
        token,
    ))
}
