//! share::writer
//!
//! The Config Writer: persists a producer's declared outputs in bounded,
//! strictly ordered batches.
//!
//! # Algorithm
//!
//! 1. Collapse duplicate property names (last declaration wins; the
//!    first declaration's position is kept).
//! 2. Partition the list into chunks no larger than the store's per-call
//!    write limit.
//! 3. Issue one `batch_put` per chunk, in order. On a chunk failure,
//!    abort all remaining chunks and report which properties were in the
//!    failed chunk and which were never attempted.
//!
//! No chunk is retried automatically. The write is an idempotent upsert,
//! so the documented recovery is to re-run the synthesis; retry policy
//! stays with the caller.
//!
//! The writer never touches the local descriptor file; reconciling that
//! projection is the lifecycle controller's job, outside this path.

use thiserror::Error;

use crate::core::identity::StoreIdentity;
use crate::core::types::{ConfigValue, ProducerName, PropertyName};
use crate::store::{ConfigKey, ConfigRecord, ConfigStore, StoreError};

/// One declared output: a property and its validated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// The property this output publishes.
    pub property: PropertyName,
    /// The validated, tagged value.
    pub value: ConfigValue,
}

impl Output {
    /// Build an output from its parts.
    pub fn new(property: PropertyName, value: ConfigValue) -> Self {
        Self { property, value }
    }
}

/// A batch-sequence write failure.
///
/// Identifies the store, the chunk that failed, the properties inside
/// that chunk, and every property in chunks that were never attempted.
/// Everything before `batch_index` was already persisted and remains so.
#[derive(Debug, Error)]
#[error(
    "write to store '{identity}' failed on batch {batch}/{batches}: {source}; \
     properties in the failed batch: [{failed}]; never attempted: [{unattempted}]; \
     re-run the synthesis to publish them",
    batch = .batch_index + 1,
    failed = display_names(.failed),
    unattempted = display_names(.unattempted),
)]
pub struct WriteBatchError {
    /// Identity of the store that rejected the write.
    pub identity: StoreIdentity,
    /// Zero-based index of the failed chunk.
    pub batch_index: usize,
    /// Total chunks in the sequence.
    pub batches: usize,
    /// Properties in the failed chunk.
    pub failed: Vec<PropertyName>,
    /// Properties in chunks that were never attempted.
    pub unattempted: Vec<PropertyName>,
    /// The store error that aborted the sequence.
    #[source]
    pub source: StoreError,
}

impl WriteBatchError {
    /// Every property that did not make it into the store.
    pub fn unpersisted(&self) -> impl Iterator<Item = &PropertyName> {
        self.failed.iter().chain(self.unattempted.iter())
    }
}

fn display_names(names: &[PropertyName]) -> String {
    names
        .iter()
        .map(PropertyName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Summary of a completed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Entries persisted (after duplicate collapse).
    pub entries: usize,
    /// Batches issued.
    pub batches: usize,
}

/// The Config Writer.
///
/// Holds a reference to the injected store client for the duration of a
/// run. One writer serves one producer's flush.
///
/// # Example
///
/// ```ignore
/// let writer = ConfigWriter::new(store.as_ref());
/// let report = writer.publish(&producer, &outputs).await?;
/// println!("wrote {} entries in {} batches", report.entries, report.batches);
/// ```
pub struct ConfigWriter<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> ConfigWriter<'a> {
    /// Create a writer over the given store client.
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// Persist a producer's outputs.
    ///
    /// Duplicate property names in `outputs` collapse silently, last
    /// declaration wins. Chunks are written strictly in order; the first
    /// failure aborts the remainder of the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`WriteBatchError`] naming the failed chunk's properties
    /// and every never-attempted property. Chunks before the failure
    /// remain persisted.
    pub async fn publish(
        &self,
        producer: &ProducerName,
        outputs: &[Output],
    ) -> Result<WriteReport, WriteBatchError> {
        let deduped = collapse_duplicates(outputs);
        if deduped.is_empty() {
            return Ok(WriteReport {
                entries: 0,
                batches: 0,
            });
        }

        let records: Vec<ConfigRecord> = deduped
            .iter()
            .map(|output| {
                ConfigRecord::new(
                    ConfigKey::new(producer.clone(), output.property.clone()),
                    output.value.clone(),
                )
            })
            .collect();

        let limit = self.store.write_limit();
        let chunks: Vec<&[ConfigRecord]> = records.chunks(limit).collect();
        let batches = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            if let Err(source) = self.store.batch_put(chunk).await {
                let failed = chunk.iter().map(|r| r.key.property.clone()).collect();
                let unattempted = chunks[index + 1..]
                    .iter()
                    .flat_map(|c| c.iter().map(|r| r.key.property.clone()))
                    .collect();
                return Err(WriteBatchError {
                    identity: self.store.identity().clone(),
                    batch_index: index,
                    batches,
                    failed,
                    unattempted,
                    source,
                });
            }
        }

        Ok(WriteReport {
            entries: records.len(),
            batches,
        })
    }
}

/// Collapse duplicate property names, last value wins, first position kept.
fn collapse_duplicates(outputs: &[Output]) -> Vec<Output> {
    let mut ordered: Vec<Output> = Vec::with_capacity(outputs.len());
    for output in outputs {
        match ordered.iter_mut().find(|o| o.property == output.property) {
            Some(existing) => existing.value = output.value.clone(),
            None => ordered.push(output.clone()),
        }
    }
    ordered
}
