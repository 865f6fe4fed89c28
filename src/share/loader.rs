//! share::loader
//!
//! The Config Loader: resolves `"producer.property"` references into
//! values through batched reads, with fail-fast validation.
//!
//! # Algorithm
//!
//! 1. Parse every reference string. A malformed reference fails the load
//!    immediately, before any store call.
//! 2. Deduplicate the parsed references (preserving first-seen order) so
//!    each key is fetched once.
//! 3. Issue `batch_get` calls in chunks no larger than the store's
//!    per-call read limit, merging results.
//! 4. Validate that every *originally requested* reference resolved.
//!    Any absence fails the whole load; partial results are never handed
//!    to module logic.
//!
//! The failure names every missing reference and the store identity
//! queried, and instructs that the producing module must be run first.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::core::identity::StoreIdentity;
use crate::core::reference::{ParseError, Reference};
use crate::store::{ConfigKey, ConfigStore, StoreError, StoredValue};

/// Errors from resolving references.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A reference string failed to parse. Detected before any I/O.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The store could not be read.
    #[error("failed to read store '{identity}': {source}")]
    Store {
        /// Identity of the store that was queried.
        identity: StoreIdentity,
        /// The underlying store error.
        #[source]
        source: StoreError,
    },

    /// One or more requested references are absent after a completed read.
    #[error(
        "missing configuration in store '{identity}': [{refs}]; \
         run the producing module's synthesis first so its outputs are published",
        refs = display_references(.missing),
    )]
    Missing {
        /// Identity of the store that was queried.
        identity: StoreIdentity,
        /// Every requested reference that did not resolve.
        missing: Vec<Reference>,
    },
}

fn display_references(refs: &[Reference]) -> String {
    refs.iter()
        .map(Reference::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The resolved inputs of one load: reference -> stored value.
///
/// Values are raw strings plus their type tag; decoding by value type is
/// the consumer's job.
#[derive(Debug, Clone, Default)]
pub struct ResolvedInputs {
    values: HashMap<Reference, StoredValue>,
}

impl ResolvedInputs {
    /// The raw value for a reference, if it was requested and resolved.
    pub fn get(&self, reference: &Reference) -> Option<&str> {
        self.values.get(reference).map(|v| v.value.as_str())
    }

    /// The full stored value (payload + type tag) for a reference.
    pub fn get_stored(&self, reference: &Reference) -> Option<&StoredValue> {
        self.values.get(reference)
    }

    /// Number of resolved references.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (reference, stored value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Reference, &StoredValue)> {
        self.values.iter()
    }

    /// Seed a resolved value directly, bypassing the loader.
    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, reference: Reference, value: StoredValue) {
        self.values.insert(reference, value);
    }
}

/// The Config Loader.
///
/// Holds a reference to the injected store client; one loader serves one
/// run's input-resolution phase.
///
/// # Example
///
/// ```ignore
/// let loader = ConfigLoader::new(store.as_ref());
/// let inputs = loader.load(&["foundation.createdAt".to_string()]).await?;
/// let created = inputs.get(&"foundation.createdAt".parse()?).unwrap();
/// ```
pub struct ConfigLoader<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> ConfigLoader<'a> {
    /// Create a loader over the given store client.
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Resolve raw reference strings into values.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Parse`] for the first malformed reference, before
    ///   any store call
    /// - [`LoadError::Store`] when a batched read fails; the remainder of
    ///   the phase is aborted
    /// - [`LoadError::Missing`] when any originally requested reference
    ///   is absent from the merged result
    pub async fn load(&self, raw_references: &[String]) -> Result<ResolvedInputs, LoadError> {
        let references = raw_references
            .iter()
            .map(|raw| Reference::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        self.load_references(&references).await
    }

    /// Resolve already-parsed references into values.
    ///
    /// Deduplicates before reading, then validates every reference in
    /// `references` (not just the deduplicated set) against the merged
    /// result.
    pub async fn load_references(
        &self,
        references: &[Reference],
    ) -> Result<ResolvedInputs, LoadError> {
        if references.is_empty() {
            return Ok(ResolvedInputs::default());
        }

        // Dedup preserving first-seen order to keep read batches minimal.
        let mut seen = HashSet::new();
        let unique: Vec<&Reference> = references
            .iter()
            .filter(|r| seen.insert((*r).clone()))
            .collect();

        let keys: Vec<ConfigKey> = unique.iter().map(|r| ConfigKey::from(*r)).collect();

        let mut found: HashMap<ConfigKey, StoredValue> = HashMap::with_capacity(keys.len());
        for chunk in keys.chunks(self.store.read_limit()) {
            let partial = self
                .store
                .batch_get(chunk)
                .await
                .map_err(|source| LoadError::Store {
                    identity: self.store.identity().clone(),
                    source,
                })?;
            found.extend(partial);
        }

        // Validate every originally requested reference, not the deduped set.
        let mut missing: Vec<Reference> = Vec::new();
        let mut missing_seen = HashSet::new();
        for reference in references {
            let key = ConfigKey::from(reference);
            if !found.contains_key(&key) && missing_seen.insert(reference.clone()) {
                missing.push(reference.clone());
            }
        }
        if !missing.is_empty() {
            return Err(LoadError::Missing {
                identity: self.store.identity().clone(),
                missing,
            });
        }

        let mut values = HashMap::with_capacity(unique.len());
        for reference in unique {
            let key = ConfigKey::from(reference);
            if let Some(value) = found.get(&key) {
                values.insert(reference.clone(), value.clone());
            }
        }
        Ok(ResolvedInputs { values })
    }
}
