//! core::descriptor::schema
//!
//! Module descriptor schema.
//!
//! # Schema Design
//!
//! The descriptor is the local JSON mirror of what a module shares:
//! which references it requires as inputs and which properties it
//! publishes, with their value types. It describes schema only, never a
//! live value. Parsing is strict (unknown fields rejected) and validates
//! set semantics on load: `requiredInputs` is an ordered set, `outputs`
//! holds at most one entry per property name.
//!
//! # Example
//!
//! ```
//! use crosswire::core::descriptor::schema::{parse_descriptor, ModuleDescriptor};
//! use crosswire::core::types::{ProducerName, ValueType, PropertyName};
//!
//! let producer = ProducerName::new("net").unwrap();
//! let mut descriptor = ModuleDescriptor::new(producer, "network module", "scaffold");
//!
//! let vpc = PropertyName::new("vpcId").unwrap();
//! assert!(descriptor.ensure_output(vpc.clone(), ValueType::String));
//! // Re-declaring the same schema entry changes nothing.
//! assert!(!descriptor.ensure_output(vpc, ValueType::String));
//!
//! let json = descriptor.to_canonical_json().unwrap();
//! let parsed = parse_descriptor(&json).unwrap();
//! assert_eq!(parsed.outputs.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::reference::Reference;
use crate::core::types::{ProducerName, PropertyName, UtcTimestamp, ValueType};

/// Errors from descriptor schema operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse descriptor: {0}")]
    ParseError(String),

    #[error("failed to serialize descriptor: {0}")]
    SerializeError(String),

    #[error("duplicate output property '{0}' in descriptor")]
    DuplicateOutput(PropertyName),

    #[error("duplicate required input '{0}' in descriptor")]
    DuplicateInput(Reference),
}

/// One output schema entry: property name plus value type, never a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSchema {
    /// The published property.
    #[serde(rename = "propertyName")]
    pub property_name: PropertyName,
    /// How consumers should interpret the published value.
    #[serde(rename = "valueType")]
    pub value_type: ValueType,
}

/// The local descriptor of one producing module.
///
/// Created once when the module is scaffolded; amended (never replaced)
/// as new shareable outputs are declared. The lifecycle controller is
/// the only writer after scaffolding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    /// The module's producer name.
    #[serde(rename = "moduleName")]
    pub module_name: ProducerName,
    /// Human-readable description.
    pub description: String,
    /// When the module was scaffolded.
    #[serde(rename = "createdAt")]
    pub created_at: UtcTimestamp,
    /// Who (or what tooling) scaffolded it.
    #[serde(rename = "createdBy")]
    pub created_by: String,
    /// References this module requires as inputs, in declaration order.
    #[serde(rename = "requiredInputs")]
    pub required_inputs: Vec<Reference>,
    /// Schema of the properties this module publishes.
    pub outputs: Vec<OutputSchema>,
}

impl ModuleDescriptor {
    /// Create a fresh descriptor for a newly scaffolded module.
    pub fn new(
        module_name: ProducerName,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            module_name,
            description: description.into(),
            created_at: UtcTimestamp::now(),
            created_by: created_by.into(),
            required_inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Validate set semantics.
    ///
    /// # Errors
    ///
    /// Returns an error when `outputs` repeats a property name or
    /// `requiredInputs` repeats a reference.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, output) in self.outputs.iter().enumerate() {
            if self.outputs[..i]
                .iter()
                .any(|o| o.property_name == output.property_name)
            {
                return Err(SchemaError::DuplicateOutput(output.property_name.clone()));
            }
        }
        for (i, input) in self.required_inputs.iter().enumerate() {
            if self.required_inputs[..i].iter().any(|r| r == input) {
                return Err(SchemaError::DuplicateInput(input.clone()));
            }
        }
        Ok(())
    }

    /// Record an output schema entry, idempotently.
    ///
    /// Adds {property, valueType} if absent; if the property is already
    /// recorded with a different value type, the new type wins. Returns
    /// `true` when the descriptor changed.
    pub fn ensure_output(&mut self, property: PropertyName, value_type: ValueType) -> bool {
        match self
            .outputs
            .iter_mut()
            .find(|o| o.property_name == property)
        {
            Some(existing) => {
                if existing.value_type == value_type {
                    false
                } else {
                    existing.value_type = value_type;
                    true
                }
            }
            None => {
                self.outputs.push(OutputSchema {
                    property_name: property,
                    value_type,
                });
                true
            }
        }
    }

    /// Record a required input, idempotently. Returns `true` when added.
    pub fn ensure_required_input(&mut self, reference: Reference) -> bool {
        if self.required_inputs.contains(&reference) {
            false
        } else {
            self.required_inputs.push(reference);
            true
        }
    }

    /// Serialize to canonical pretty JSON (trailing newline included).
    pub fn to_canonical_json(&self) -> Result<String, SchemaError> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| SchemaError::SerializeError(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// A stable hash over the declared schema.
    ///
    /// Computed over sorted inputs and outputs so entry order does not
    /// matter; used to detect descriptor drift between runs.
    pub fn fingerprint(&self) -> String {
        let mut inputs: Vec<String> = self.required_inputs.iter().map(|r| r.to_string()).collect();
        inputs.sort();
        let mut outputs: Vec<String> = self
            .outputs
            .iter()
            .map(|o| format!("{}:{}", o.property_name, o.value_type))
            .collect();
        outputs.sort();

        let mut hasher = Sha256::new();
        hasher.update(self.module_name.as_str().as_bytes());
        hasher.update(b"\0");
        for line in inputs.iter().chain(outputs.iter()) {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Parse descriptor JSON with strict validation.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, carries unknown fields,
/// or violates set semantics.
///
/// # Example
///
/// ```
/// use crosswire::core::descriptor::schema::parse_descriptor;
///
/// let json = r#"{
///     "moduleName": "net",
///     "description": "network module",
///     "createdAt": "2024-01-01T00:00:00Z",
///     "createdBy": "scaffold",
///     "requiredInputs": ["foundation.sharedKeyArn"],
///     "outputs": [{"propertyName": "vpcId", "valueType": "string"}]
/// }"#;
///
/// let descriptor = parse_descriptor(json).unwrap();
/// assert_eq!(descriptor.module_name.as_str(), "net");
/// ```
pub fn parse_descriptor(json: &str) -> Result<ModuleDescriptor, SchemaError> {
    let descriptor: ModuleDescriptor =
        serde_json::from_str(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;
    descriptor.validate()?;
    Ok(descriptor)
}
