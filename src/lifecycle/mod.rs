//! lifecycle
//!
//! The module lifecycle controller - the execution contract every
//! module's synthesis run follows.
//!
//! # Architecture
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! Constructed -> InputsLoaded -> Initializing -> OutputsCollected
//!             -> Persisted -> Done
//! ```
//!
//! 1. **Constructed**: the runner holds the module's descriptor and the
//!    injected store client
//! 2. **InputsLoaded**: every declared required input resolved through
//!    the loader, or the run has already failed
//! 3. **Initializing**: module-specific logic executes against the
//!    [`SynthContext`]
//! 4. **OutputsCollected**: the pending-outputs buffer is complete
//! 5. **Persisted**: exactly one writer flush covered the full buffer
//! 6. **Done**: the local descriptor was reconciled (best effort)
//!
//! # Invariants
//!
//! - Module logic never starts before all required inputs are resolved
//! - Module logic reads only inputs it declared (defensive check)
//! - Exactly one flush per run, after logic completes, covering both
//!   construction-time and logic-phase outputs
//! - Loader and writer failures are fatal; descriptor-file failures are
//!   warnings (documentation drift is tolerated, functional propagation
//!   is not)
//!
//! # Composition
//!
//! There is no module base class. The runner accepts any [`ModuleLogic`]
//! implementation and injects resolved inputs through the context; what
//! a module *is* stays entirely in its logic value.

pub mod context;
pub mod logic;
pub mod runner;

pub use context::{ContextError, PlatformOutput, SynthContext};
pub use logic::ModuleLogic;
pub use runner::{ModuleHandle, ModuleRunner, RunError, RunOutcome, RunState};
