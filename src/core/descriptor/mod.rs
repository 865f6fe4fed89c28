//! core::descriptor
//!
//! The local descriptor file: one JSON document per producing module.
//!
//! # Design
//!
//! The descriptor is a best-effort projection of the module's shared
//! schema, owned exclusively by the module's own tooling. Saves are
//! atomic (write to a temp file, then rename) so a crashed run never
//! leaves a torn file, but there is no cross-process locking: the
//! ownership contract says only this module's runs mutate it.
//!
//! Remote store correctness never depends on this file. The lifecycle
//! controller reconciles it after outputs flush, and treats any failure
//! here as a warning, not a run failure.

pub mod schema;

pub use schema::{parse_descriptor, ModuleDescriptor, OutputSchema, SchemaError};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the descriptor inside a module directory.
pub const DESCRIPTOR_FILE_NAME: &str = "crosswire.module.json";

/// Errors from descriptor file operations.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor not found at '{0}'")]
    NotFound(PathBuf),

    #[error("failed to read descriptor '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write descriptor '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("descriptor '{path}' is invalid: {source}")]
    Schema {
        path: PathBuf,
        source: SchemaError,
    },
}

/// Handle to one module's descriptor file.
///
/// # Example
///
/// ```no_run
/// use crosswire::core::descriptor::DescriptorFile;
/// use std::path::Path;
///
/// let file = DescriptorFile::in_dir(Path::new("/path/to/module"));
/// let descriptor = file.load().unwrap();
/// println!("{} outputs declared", descriptor.outputs.len());
/// ```
#[derive(Debug, Clone)]
pub struct DescriptorFile {
    path: PathBuf,
}

impl DescriptorFile {
    /// Handle to the descriptor inside a module directory.
    pub fn in_dir(module_dir: &Path) -> Self {
        Self {
            path: module_dir.join(DESCRIPTOR_FILE_NAME),
        }
    }

    /// Handle to a descriptor at an explicit path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this handle reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the descriptor file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the descriptor.
    ///
    /// # Errors
    ///
    /// - [`DescriptorError::NotFound`] when the file does not exist
    /// - [`DescriptorError::Schema`] when it fails strict parsing
    pub fn load(&self) -> Result<ModuleDescriptor, DescriptorError> {
        if !self.path.exists() {
            return Err(DescriptorError::NotFound(self.path.clone()));
        }
        let json = fs::read_to_string(&self.path).map_err(|source| DescriptorError::ReadError {
            path: self.path.clone(),
            source,
        })?;
        parse_descriptor(&json).map_err(|source| DescriptorError::Schema {
            path: self.path.clone(),
            source,
        })
    }

    /// Save the descriptor atomically.
    ///
    /// Creates parent directories if needed, writes to a temp file in the
    /// same directory, syncs, then renames over the target.
    pub fn save(&self, descriptor: &ModuleDescriptor) -> Result<(), DescriptorError> {
        let contents = descriptor
            .to_canonical_json()
            .map_err(|source| DescriptorError::Schema {
                path: self.path.clone(),
                source,
            })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| DescriptorError::WriteError {
                path: self.path.clone(),
                source,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut file =
            fs::File::create(&temp_path).map_err(|source| DescriptorError::WriteError {
                path: temp_path.clone(),
                source,
            })?;
        file.write_all(contents.as_bytes())
            .map_err(|source| DescriptorError::WriteError {
                path: temp_path.clone(),
                source,
            })?;
        file.sync_all().map_err(|source| DescriptorError::WriteError {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| DescriptorError::WriteError {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
