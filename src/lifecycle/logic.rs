//! lifecycle::logic
//!
//! The module-logic capability trait.
//!
//! # Design
//!
//! Modules are values, not subclasses. Anything implementing
//! [`ModuleLogic`] can be driven through the lifecycle runner; the
//! runner owns sequencing, input resolution, and the output flush, and
//! the logic owns only what happens during the Initializing phase.
//!
//! Logic errors are deliberately untyped (`anyhow`): module logic is the
//! open end of the system, and the runner treats any failure there the
//! same way - the run aborts with no flush.

use async_trait::async_trait;

use super::context::SynthContext;

/// Module-specific synthesis logic.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use crosswire::core::types::ConfigValue;
/// use crosswire::lifecycle::{ModuleLogic, SynthContext};
///
/// struct NetworkModule;
///
/// #[async_trait]
/// impl ModuleLogic for NetworkModule {
///     async fn initialize(&self, ctx: &mut SynthContext) -> anyhow::Result<()> {
///         ctx.create_output("vpcId", ConfigValue::string("vpc-123"), true)?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait ModuleLogic: Send + Sync {
    /// Run the module's logic against the synthesis context.
    ///
    /// Inputs are fully resolved before this is called; outputs declared
    /// here are flushed after it returns. Returning an error aborts the
    /// run before anything is persisted.
    async fn initialize(&self, ctx: &mut SynthContext) -> anyhow::Result<()>;
}
