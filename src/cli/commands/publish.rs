//! publish command - Write a producer's outputs from a values file.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use super::stage_context;
use crate::core::types::{ConfigValue, ProducerName, PropertyName, ValueType};
use crate::share::writer::{ConfigWriter, Output};
use crate::ui::output::{self, Verbosity};

/// One entry of the values file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueEntry {
    property: String,
    value: String,
    #[serde(rename = "type")]
    value_type: ValueType,
}

/// Publish outputs read from a JSON values file through the writer.
pub async fn publish(
    project_dir: &Path,
    producer: &str,
    from: &Path,
    stage: &str,
    verbosity: Verbosity,
) -> Result<()> {
    let ctx = stage_context(project_dir, stage)?;
    let producer = ProducerName::new(producer)?;

    let contents = fs::read_to_string(from)
        .with_context(|| format!("reading values file '{}'", from.display()))?;
    let entries: Vec<ValueEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing values file '{}'", from.display()))?;

    let mut outputs = Vec::with_capacity(entries.len());
    for entry in entries {
        let property = PropertyName::new(entry.property.as_str())?;
        let value = ConfigValue::new(entry.value_type, entry.value)
            .with_context(|| format!("value for property '{}'", property))?;
        outputs.push(Output::new(property, value));
    }

    let writer = ConfigWriter::new(ctx.store.as_ref());
    let report = writer.publish(&producer, &outputs).await?;

    output::print(
        format!(
            "published {} entries for '{}' to '{}' in {} batches",
            report.entries, producer, ctx.identity, report.batches
        ),
        verbosity,
    );
    Ok(())
}
