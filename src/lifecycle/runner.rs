//! lifecycle::runner
//!
//! The lifecycle runner - the single entry point for module execution.
//!
//! # Architecture
//!
//! ```text
//! Constructed -> InputsLoaded -> Initializing -> OutputsCollected
//!             -> Persisted -> Done
//! ```
//!
//! **Key principle:** module logic cannot reach the store directly. All
//! reads happen in the input-resolution phase before logic starts, and
//! all writes happen in the single flush after it completes. A failure
//! while loading inputs or persisting outputs is fatal to the run; a
//! failure updating the local descriptor is logged and tolerated.
//!
//! # Example
//!
//! ```ignore
//! use crosswire::lifecycle::{ModuleHandle, ModuleRunner};
//!
//! let handle = ModuleHandle::from_dir(Path::new("./modules/network"))?;
//! let runner = ModuleRunner::new(store.as_ref(), verbosity);
//! let outcome = runner.run(&handle, &logic, Vec::new()).await?;
//! println!("persisted {} outputs", outcome.report.entries);
//! ```

use std::path::Path;

use thiserror::Error;

use super::context::{PlatformOutput, SynthContext};
use super::logic::ModuleLogic;
use crate::core::descriptor::{DescriptorError, DescriptorFile, ModuleDescriptor};
use crate::share::loader::{ConfigLoader, LoadError};
use crate::share::writer::{ConfigWriter, Output, WriteBatchError, WriteReport};
use crate::store::ConfigStore;
use crate::ui::output::{self, Verbosity};

/// The states a run moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    /// Descriptor and store client in hand, nothing resolved yet.
    Constructed,
    /// Every declared required input resolved.
    InputsLoaded,
    /// Module logic executing.
    Initializing,
    /// The pending-outputs buffer is complete.
    OutputsCollected,
    /// The single flush succeeded.
    Persisted,
    /// Descriptor reconciled (best effort); the run is over.
    Done,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Constructed => "constructed",
            RunState::InputsLoaded => "inputs-loaded",
            RunState::Initializing => "initializing",
            RunState::OutputsCollected => "outputs-collected",
            RunState::Persisted => "persisted",
            RunState::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Errors that abort a run.
///
/// Each variant corresponds to the phase that failed; there is no
/// partially-deployed state to report because the failing phase aborts
/// everything after it.
#[derive(Debug, Error)]
pub enum RunError {
    /// The module descriptor could not be read at construction.
    #[error("cannot start run: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Input resolution failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Module logic failed during the Initializing phase.
    #[error("module logic failed: {0}")]
    Logic(#[source] anyhow::Error),

    /// The output flush failed.
    #[error(transparent)]
    Flush(#[from] WriteBatchError),
}

/// A module as the runner sees it: its descriptor, plus the file to
/// reconcile if the module has a local mirror.
#[derive(Debug)]
pub struct ModuleHandle {
    descriptor: ModuleDescriptor,
    file: Option<DescriptorFile>,
}

impl ModuleHandle {
    /// Load a module's descriptor from its directory.
    pub fn from_dir(module_dir: &Path) -> Result<Self, DescriptorError> {
        let file = DescriptorFile::in_dir(module_dir);
        let descriptor = file.load()?;
        Ok(Self {
            descriptor,
            file: Some(file),
        })
    }

    /// A handle with no backing file.
    ///
    /// Used for modules whose schema is fixed in code (the foundation
    /// module); descriptor reconciliation becomes a no-op.
    pub fn ephemeral(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            file: None,
        }
    }

    /// The module's descriptor.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Terminal state; always [`RunState::Done`] for a returned outcome.
    pub state: RunState,
    /// What the flush persisted.
    pub report: WriteReport,
    /// Every platform-level output the run recorded.
    pub outputs: Vec<PlatformOutput>,
    /// Whether the descriptor file was brought in sync (false when the
    /// update failed and was downgraded to a warning, or when the module
    /// has no backing file and nothing needed to change).
    pub descriptor_synced: bool,
}

/// The lifecycle runner.
///
/// One runner drives one module's synthesis run against one injected
/// store client.
pub struct ModuleRunner<'a> {
    store: &'a dyn ConfigStore,
    verbosity: Verbosity,
}

impl<'a> ModuleRunner<'a> {
    /// Create a runner over the given store client.
    pub fn new(store: &'a dyn ConfigStore, verbosity: Verbosity) -> Self {
        Self { store, verbosity }
    }

    /// Drive a module through the full lifecycle.
    ///
    /// `initial_outputs` are construction-time outputs; they seed the
    /// pending buffer before logic runs and flush with everything else.
    ///
    /// # Errors
    ///
    /// - [`RunError::Load`] when any declared input fails to resolve
    /// - [`RunError::Logic`] when module logic fails
    /// - [`RunError::Flush`] when the writer aborts the batch sequence
    ///
    /// Descriptor reconciliation failures are *not* errors; they are
    /// logged as warnings and reflected in
    /// [`RunOutcome::descriptor_synced`].
    pub async fn run(
        &self,
        module: &ModuleHandle,
        logic: &dyn ModuleLogic,
        initial_outputs: Vec<Output>,
    ) -> Result<RunOutcome, RunError> {
        let descriptor = &module.descriptor;
        let mut state = RunState::Constructed;
        output::debug(
            format!("run {}: {}", descriptor.module_name, state),
            self.verbosity,
        );

        // Input resolution is a blocking prerequisite; logic never starts
        // before every declared reference resolves.
        let loader = ConfigLoader::new(self.store);
        let inputs = loader.load_references(&descriptor.required_inputs).await?;
        state = RunState::InputsLoaded;
        output::debug(
            format!(
                "run {}: {} ({} inputs)",
                descriptor.module_name,
                state,
                inputs.len()
            ),
            self.verbosity,
        );

        let mut ctx = SynthContext::new(
            descriptor.module_name.clone(),
            inputs,
            initial_outputs,
        );
        state = RunState::Initializing;
        output::debug(
            format!("run {}: {}", descriptor.module_name, state),
            self.verbosity,
        );
        logic
            .initialize(&mut ctx)
            .await
            .map_err(RunError::Logic)?;

        state = RunState::OutputsCollected;
        let (pending, platform) = ctx.into_outputs();
        output::debug(
            format!(
                "run {}: {} ({} shareable)",
                descriptor.module_name,
                state,
                pending.len()
            ),
            self.verbosity,
        );

        let writer = ConfigWriter::new(self.store);
        let report = writer.publish(&descriptor.module_name, &pending).await?;
        state = RunState::Persisted;
        output::debug(
            format!(
                "run {}: {} ({} entries, {} batches)",
                descriptor.module_name, state, report.entries, report.batches
            ),
            self.verbosity,
        );

        let descriptor_synced = self.reconcile_descriptor(module, &pending);
        state = RunState::Done;

        Ok(RunOutcome {
            state,
            report,
            outputs: platform,
            descriptor_synced,
        })
    }

    /// Bring the descriptor's output schema in line with what was
    /// flushed. Best effort: failures become warnings, never run
    /// failures.
    fn reconcile_descriptor(&self, module: &ModuleHandle, pending: &[Output]) -> bool {
        let Some(file) = &module.file else {
            return true;
        };

        let mut descriptor = match file.load() {
            Ok(d) => d,
            Err(err) => {
                output::warn(
                    format!(
                        "descriptor at '{}' not reconciled: {}",
                        file.path().display(),
                        err
                    ),
                    self.verbosity,
                );
                return false;
            }
        };

        let mut changed = false;
        for output in pending {
            changed |= descriptor.ensure_output(output.property.clone(), output.value.value_type());
        }
        if !changed {
            return true;
        }

        match file.save(&descriptor) {
            Ok(()) => true,
            Err(err) => {
                output::warn(
                    format!(
                        "descriptor at '{}' not reconciled: {}",
                        file.path().display(),
                        err
                    ),
                    self.verbosity,
                );
                false
            }
        }
    }
}
