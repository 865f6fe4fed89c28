//! store::mock
//!
//! Mock store implementation for deterministic testing.
//!
//! # Design
//!
//! The mock store provides a deterministic in-memory implementation of
//! the [`ConfigStore`] trait. It supports pre-seeding entries,
//! configurable failure injection (including failing only after N
//! successful writes, for exercising partial batch-sequence aborts), and
//! a recorded-operations log so tests can assert exactly how many calls
//! reached the store.
//!
//! # Example
//!
//! ```
//! use crosswire::store::mock::MockStore;
//! use crosswire::store::{ConfigKey, ConfigRecord, ConfigStore};
//! use crosswire::core::identity::StoreIdentity;
//! use crosswire::core::types::{ConfigValue, ProducerName, PropertyName, StageName};
//!
//! # tokio_test::block_on(async {
//! let identity = StoreIdentity::derive("acme", &StageName::new("dev").unwrap());
//! let store = MockStore::new(identity);
//!
//! let key = ConfigKey::new(
//!     ProducerName::new("foundation").unwrap(),
//!     PropertyName::new("createdAt").unwrap(),
//! );
//! let record = ConfigRecord::new(key.clone(), ConfigValue::string("2024-01-01T00:00:00Z"));
//!
//! store.batch_put(&[record]).await.unwrap();
//! let found = store.batch_get(&[key.clone()]).await.unwrap();
//! assert_eq!(found[&key].value, "2024-01-01T00:00:00Z");
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{
    ConfigKey, ConfigRecord, ConfigStore, StoreError, StoredValue, DEFAULT_READ_LIMIT,
    DEFAULT_WRITE_LIMIT,
};
use crate::core::identity::StoreIdentity;

/// Mock store for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state.
#[derive(Debug, Clone)]
pub struct MockStore {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockStoreInner>>,
    /// Identity reported to callers.
    identity: StoreIdentity,
    /// Per-call write limit (defaults to the production limit).
    write_limit: usize,
    /// Per-call read limit (defaults to the production limit).
    read_limit: usize,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockStoreInner {
    /// Stored entries by key.
    entries: HashMap<ConfigKey, StoredValue>,
    /// Failure injection configuration.
    fail_on: Option<FailOn>,
    /// Successful batch_put calls so far (drives `BatchPutAfter`).
    successful_puts: usize,
    /// Recorded operations for verification.
    operations: Vec<StoreOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every batch_get with the given error.
    BatchGet(StoreError),
    /// Fail every batch_put with the given error.
    BatchPut(StoreError),
    /// Let `after` batch_put calls succeed, then fail every subsequent one.
    BatchPutAfter {
        /// Number of puts that succeed before failures begin.
        after: usize,
        /// The error to return once failing.
        error: StoreError,
    },
}

/// Recorded operation for test verification.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    BatchGet {
        /// Keys requested, in call order.
        keys: Vec<ConfigKey>,
    },
    BatchPut {
        /// Keys written, in call order.
        keys: Vec<ConfigKey>,
    },
}

impl MockStore {
    /// Create a new empty mock store with the given identity.
    pub fn new(identity: StoreIdentity) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockStoreInner {
                entries: HashMap::new(),
                fail_on: None,
                successful_puts: 0,
                operations: Vec::new(),
            })),
            identity,
            write_limit: DEFAULT_WRITE_LIMIT,
            read_limit: DEFAULT_READ_LIMIT,
        }
    }

    /// Create a mock store pre-seeded with entries.
    pub fn with_entries(
        identity: StoreIdentity,
        entries: impl IntoIterator<Item = (ConfigKey, StoredValue)>,
    ) -> Self {
        let store = Self::new(identity);
        {
            let mut inner = store.inner.lock().unwrap();
            inner.entries.extend(entries);
        }
        store
    }

    /// Override the per-call limits (for tests exercising chunking with
    /// small batches).
    pub fn with_limits(mut self, read_limit: usize, write_limit: usize) -> Self {
        self.read_limit = read_limit;
        self.write_limit = write_limit;
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use crosswire::store::mock::{FailOn, MockStore};
    /// use crosswire::store::StoreError;
    /// use crosswire::core::identity::StoreIdentity;
    /// use crosswire::core::types::StageName;
    ///
    /// let identity = StoreIdentity::derive("acme", &StageName::new("dev").unwrap());
    /// let store = MockStore::new(identity)
    ///     .fail_on(FailOn::BatchPut(StoreError::Throttled));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    ///
    /// Useful for verifying how many calls reached the store (e.g. that a
    /// parse error issued zero network calls).
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a single entry directly, bypassing the batched API.
    pub fn entry(&self, key: &ConfigKey) -> Option<StoredValue> {
        self.inner.lock().unwrap().entries.get(key).cloned()
    }
}

#[async_trait]
impl ConfigStore for MockStore {
    fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    fn read_limit(&self) -> usize {
        self.read_limit
    }

    fn write_limit(&self) -> usize {
        self.write_limit
    }

    async fn batch_get(
        &self,
        keys: &[ConfigKey],
    ) -> Result<HashMap<ConfigKey, StoredValue>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(StoreOperation::BatchGet {
            keys: keys.to_vec(),
        });

        if let Some(FailOn::BatchGet(ref err)) = inner.fail_on {
            return Err(err.clone());
        }

        let mut found = HashMap::new();
        for key in keys {
            if let Some(value) = inner.entries.get(key) {
                found.insert(key.clone(), value.clone());
            }
        }
        Ok(found)
    }

    async fn batch_put(&self, records: &[ConfigRecord]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(StoreOperation::BatchPut {
            keys: records.iter().map(|r| r.key.clone()).collect(),
        });

        if records.len() > self.write_limit {
            return Err(StoreError::BatchTooLarge {
                given: records.len(),
                limit: self.write_limit,
            });
        }

        match inner.fail_on {
            Some(FailOn::BatchPut(ref err)) => return Err(err.clone()),
            Some(FailOn::BatchPutAfter { after, ref error }) => {
                if inner.successful_puts >= after {
                    return Err(error.clone());
                }
            }
            _ => {}
        }

        for record in records {
            inner.entries.insert(
                record.key.clone(),
                StoredValue {
                    value: record.value.as_str().to_string(),
                    value_type: record.value.value_type(),
                },
            );
        }
        inner.successful_puts += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ConfigValue, ProducerName, PropertyName, StageName};

    fn identity() -> StoreIdentity {
        StoreIdentity::derive("acme", &StageName::new("dev").unwrap())
    }

    fn key(producer: &str, property: &str) -> ConfigKey {
        ConfigKey::new(
            ProducerName::new(producer).unwrap(),
            PropertyName::new(property).unwrap(),
        )
    }

    fn record(producer: &str, property: &str, value: &str) -> ConfigRecord {
        ConfigRecord::new(key(producer, property), ConfigValue::string(value))
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let store = MockStore::new(identity());
        store
            .batch_put(&[record("foundation", "createdAt", "2024-01-01T00:00:00Z")])
            .await
            .unwrap();

        let k = key("foundation", "createdAt");
        let found = store.batch_get(&[k.clone()]).await.unwrap();
        assert_eq!(found[&k].value, "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn absent_keys_are_missing_not_errors() {
        let store = MockStore::new(identity());
        let found = store.batch_get(&[key("nobody", "nothing")]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn repeated_put_overwrites() {
        let store = MockStore::new(identity());
        store
            .batch_put(&[record("net", "vpcId", "vpc-1")])
            .await
            .unwrap();
        store
            .batch_put(&[record("net", "vpcId", "vpc-2")])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.entry(&key("net", "vpcId")).unwrap().value, "vpc-2");
    }

    #[tokio::test]
    async fn oversized_batch_rejected() {
        let store = MockStore::new(identity()).with_limits(100, 2);
        let records = vec![
            record("p", "a", "1"),
            record("p", "b", "2"),
            record("p", "c", "3"),
        ];
        let err = store.batch_put(&records).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge { given: 3, limit: 2 }));
    }

    #[tokio::test]
    async fn fail_on_batch_get() {
        let store = MockStore::new(identity()).fail_on(FailOn::BatchGet(StoreError::Throttled));
        let err = store.batch_get(&[key("a", "b")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Throttled));
    }

    #[tokio::test]
    async fn fail_after_n_successful_puts() {
        let store = MockStore::new(identity()).fail_on(FailOn::BatchPutAfter {
            after: 1,
            error: StoreError::Throttled,
        });

        store.batch_put(&[record("p", "a", "1")]).await.unwrap();
        let err = store.batch_put(&[record("p", "b", "2")]).await.unwrap_err();
        assert!(matches!(err, StoreError::Throttled));

        // The first batch's entries remain.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn operations_are_recorded() {
        let store = MockStore::new(identity());
        store.batch_put(&[record("p", "a", "1")]).await.unwrap();
        store.batch_get(&[key("p", "a")]).await.unwrap();

        let ops = store.operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], StoreOperation::BatchPut { .. }));
        assert!(matches!(ops[1], StoreOperation::BatchGet { .. }));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MockStore::new(identity());
        let clone = store.clone();
        store.batch_put(&[record("p", "a", "1")]).await.unwrap();
        assert_eq!(clone.len(), 1);
    }
}
