//! store::traits
//!
//! The `ConfigStore` trait: batched key-value persistence for one stage.
//!
//! # Design
//!
//! The trait is async because store operations involve network I/O. All
//! methods return `Result` so failures surface as typed errors rather
//! than panics.
//!
//! Two contract points matter to callers:
//!
//! - `batch_get` is *not* responsible for completeness. Keys that do not
//!   exist are simply absent from the returned map; whether that is an
//!   error is the loader's decision.
//! - `batch_put` acknowledges the whole call or fails it as a unit, and
//!   rejects calls larger than [`ConfigStore::write_limit`] outright.
//!   Splitting into chunks is the writer's job, never the store's.
//!
//! # Example
//!
//! ```ignore
//! use crosswire::store::{ConfigStore, ConfigKey, ConfigRecord};
//!
//! async fn fetch(store: &dyn ConfigStore, key: ConfigKey) -> Option<String> {
//!     let found = store.batch_get(&[key.clone()]).await.ok()?;
//!     found.get(&key).map(|v| v.value.clone())
//! }
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::identity::StoreIdentity;
use crate::core::reference::Reference;
use crate::core::types::{ConfigValue, ProducerName, PropertyName, ValueType};

/// Default per-call key limit for batched reads.
pub const DEFAULT_READ_LIMIT: usize = 100;

/// Default per-call item limit for batched writes.
pub const DEFAULT_WRITE_LIMIT: usize = 25;

/// Errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Authentication is required but not available.
    #[error("store authentication required (set the stage's token variable)")]
    AuthRequired,

    /// Authentication failed (invalid or expired token, missing grants).
    #[error("store authentication failed: {0}")]
    AuthFailed(String),

    /// The store instance does not exist yet.
    #[error("store '{identity}' is not provisioned; run the foundation bootstrap for this stage first")]
    NotProvisioned {
        /// Identity of the store that was addressed.
        identity: StoreIdentity,
    },

    /// The backing service rejected the call for capacity reasons.
    #[error("store throttled the request")]
    Throttled,

    /// A `batch_put` call exceeded the per-call item limit.
    #[error("batch of {given} items exceeds the store's per-call limit of {limit}")]
    BatchTooLarge {
        /// Items in the rejected call.
        given: usize,
        /// The store's per-call limit.
        limit: usize,
    },

    /// The backing service returned an error.
    #[error("store API error: {status} - {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// Network or connection error.
    #[error("store network error: {0}")]
    NetworkError(String),
}

/// Composite key of one configuration entry: (producer, property).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    /// Partition side: the producing module's name.
    pub producer: ProducerName,
    /// Sort side: the property name.
    pub property: PropertyName,
}

impl ConfigKey {
    /// Build a key from its parts.
    pub fn new(producer: ProducerName, property: PropertyName) -> Self {
        Self { producer, property }
    }
}

impl From<&Reference> for ConfigKey {
    fn from(r: &Reference) -> Self {
        Self {
            producer: r.producer().clone(),
            property: r.property().clone(),
        }
    }
}

impl From<Reference> for ConfigKey {
    fn from(r: Reference) -> Self {
        let (producer, property) = r.into_parts();
        Self { producer, property }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.producer, self.property)
    }
}

/// A full entry as persisted: key plus typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    /// The entry's composite key.
    pub key: ConfigKey,
    /// The validated, tagged value.
    pub value: ConfigValue,
}

impl ConfigRecord {
    /// Build a record from its parts.
    pub fn new(key: ConfigKey, value: ConfigValue) -> Self {
        Self { key, value }
    }
}

/// A value as returned from the store: raw payload plus its type tag.
///
/// Reads return the payload verbatim; decoding by [`ValueType`] is always
/// the consumer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    /// The raw string payload.
    pub value: String,
    /// The tag describing how to interpret it.
    pub value_type: ValueType,
}

/// Batched key-value persistence for one stage's configuration.
///
/// One implementor exists per backing service; the store addressed by a
/// run is fixed at construction via its [`StoreIdentity`] and injected
/// into the loader and writer. Implementations must be `Send + Sync` so
/// one client can serve an entire synthesis run.
///
/// # Contract
///
/// - `batch_get(keys)` returns a map containing whichever requested keys
///   exist. Absent keys are missing from the map, not errors.
/// - `batch_put(records)` persists at most [`write_limit`] records and
///   acknowledges or fails the call as a unit. Calls over the limit fail
///   with [`StoreError::BatchTooLarge`] without touching the service.
/// - Writes are upserts: re-putting a key overwrites its value. Entries
///   are never merged and never expire.
///
/// [`write_limit`]: ConfigStore::write_limit
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The identity of the store instance this client addresses.
    fn identity(&self) -> &StoreIdentity;

    /// Maximum keys per `batch_get` call.
    fn read_limit(&self) -> usize {
        DEFAULT_READ_LIMIT
    }

    /// Maximum records per `batch_put` call.
    fn write_limit(&self) -> usize {
        DEFAULT_WRITE_LIMIT
    }

    /// Fetch the requested keys, returning whichever exist.
    ///
    /// # Errors
    ///
    /// Fails only on transport or service errors; missing keys are not an
    /// error at this layer.
    async fn batch_get(
        &self,
        keys: &[ConfigKey],
    ) -> Result<HashMap<ConfigKey, StoredValue>, StoreError>;

    /// Persist the given records as one all-or-nothing call.
    ///
    /// # Errors
    ///
    /// - [`StoreError::BatchTooLarge`] when `records.len() > write_limit()`
    /// - Transport or service errors otherwise
    async fn batch_put(&self, records: &[ConfigRecord]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StageName;

    fn key(producer: &str, property: &str) -> ConfigKey {
        ConfigKey::new(
            ProducerName::new(producer).unwrap(),
            PropertyName::new(property).unwrap(),
        )
    }

    #[test]
    fn key_display_joins_with_dot() {
        assert_eq!(key("foundation", "createdAt").to_string(), "foundation.createdAt");
    }

    #[test]
    fn key_from_reference_preserves_parts() {
        let r: Reference = "data.ingest.bucketArn".parse().unwrap();
        let k = ConfigKey::from(&r);
        assert_eq!(k.producer.as_str(), "data.ingest");
        assert_eq!(k.property.as_str(), "bucketArn");
    }

    #[test]
    fn store_error_display() {
        let stage = StageName::new("dev").unwrap();
        let identity = StoreIdentity::derive("acme", &stage);

        let err = StoreError::NotProvisioned { identity };
        assert!(err.to_string().contains("acme-dev-config"));
        assert!(err.to_string().contains("foundation bootstrap"));

        let err = StoreError::BatchTooLarge { given: 30, limit: 25 };
        assert!(err.to_string().contains("30"));
        assert!(err.to_string().contains("25"));

        let err = StoreError::ApiError {
            status: 500,
            message: "internal".into(),
        };
        assert!(err.to_string().contains("500"));
    }
}
