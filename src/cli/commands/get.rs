//! get command - Resolve configuration references from a stage's store.

use std::path::Path;

use anyhow::Result;

use super::stage_context;
use crate::core::reference::Reference;
use crate::share::loader::ConfigLoader;
use crate::ui::output::{self, Verbosity};

/// Resolve references and print `reference = value` lines.
///
/// All-or-nothing: a malformed reference fails before any network call,
/// and a missing reference fails the whole command naming the store
/// queried.
pub async fn get(
    project_dir: &Path,
    references: &[String],
    stage: &str,
    verbosity: Verbosity,
) -> Result<()> {
    let ctx = stage_context(project_dir, stage)?;
    output::debug(format!("querying store '{}'", ctx.identity), verbosity);

    let loader = ConfigLoader::new(ctx.store.as_ref());
    let resolved = loader.load(references).await?;

    // Print in the order the user asked, once per distinct reference.
    let mut printed: Vec<Reference> = Vec::new();
    for raw in references {
        let reference: Reference = raw.parse()?;
        if printed.contains(&reference) {
            continue;
        }
        if let Some(value) = resolved.get(&reference) {
            println!("{}", output::format_entry(&reference, value));
        }
        printed.push(reference);
    }
    Ok(())
}
