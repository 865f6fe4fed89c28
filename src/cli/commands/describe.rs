//! describe command - Show a module's local descriptor.

use std::path::Path;

use anyhow::Result;

use crate::core::descriptor::DescriptorFile;
use crate::ui::output;

/// Print a module's declared schema.
pub fn describe(module_dir: &Path) -> Result<()> {
    let file = DescriptorFile::in_dir(module_dir);
    let descriptor = file.load()?;

    println!("module:      {}", descriptor.module_name);
    println!("description: {}", descriptor.description);
    println!("created:     {} by {}", descriptor.created_at, descriptor.created_by);
    println!("fingerprint: {}", descriptor.fingerprint());

    if descriptor.required_inputs.is_empty() {
        println!("required inputs: (none)");
    } else {
        println!("required inputs:");
        println!(
            "{}",
            output::format_list(&descriptor.required_inputs, "  - ")
        );
    }

    if descriptor.outputs.is_empty() {
        println!("outputs: (none)");
    } else {
        println!("outputs:");
        for schema in &descriptor.outputs {
            println!("  - {} ({})", schema.property_name, schema.value_type);
        }
    }
    Ok(())
}
