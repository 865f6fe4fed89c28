//! bootstrap command - Run the foundation module for a stage.

use std::path::Path;

use anyhow::Result;

use super::stage_context;
use crate::foundation::{foundation_descriptor, FoundationModule, HttpProvisioner};
use crate::lifecycle::{ModuleHandle, ModuleRunner};
use crate::ui::output::{self, Verbosity};

/// Provision a stage's store and shared resources, then publish the
/// foundation outputs.
pub async fn bootstrap(project_dir: &Path, stage: &str, verbosity: Verbosity) -> Result<()> {
    let ctx = stage_context(project_dir, stage)?;

    let token = ctx
        .stage
        .target
        .token_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok());
    let provisioner = HttpProvisioner::new(ctx.stage.target.endpoint.clone(), token);
    let foundation = FoundationModule::new(provisioner, ctx.identity.clone());
    let handle = ModuleHandle::ephemeral(foundation_descriptor());

    let runner = ModuleRunner::new(ctx.store.as_ref(), verbosity);
    let outcome = runner.run(&handle, &foundation, Vec::new()).await?;

    output::print(
        format!(
            "bootstrapped stage '{}': store '{}', {} foundation outputs published",
            ctx.stage.name, ctx.identity, outcome.report.entries
        ),
        verbosity,
    );
    for platform_output in &outcome.outputs {
        output::print(
            output::format_entry(
                format!("  foundation.{}", platform_output.name),
                platform_output.value.as_str(),
            ),
            verbosity,
        );
    }
    Ok(())
}
