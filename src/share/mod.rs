//! share
//!
//! Cross-module configuration propagation: the writer that publishes a
//! producer's outputs in bounded batches, and the loader that resolves
//! declared references with fail-fast validation.
//!
//! # Data Flow
//!
//! ```text
//! producer run:  outputs --[Writer: dedup, chunk, ordered puts]--> store
//! consumer run:  references --[Loader: parse, dedup, chunked gets,
//!                               validate-all]--> resolved inputs
//! ```
//!
//! Both sides receive their [`ConfigStore`] client injected; neither
//! derives identities or credentials on its own.
//!
//! [`ConfigStore`]: crate::store::ConfigStore

pub mod loader;
pub mod writer;

pub use loader::{ConfigLoader, LoadError, ResolvedInputs};
pub use writer::{ConfigWriter, Output, WriteBatchError, WriteReport};
