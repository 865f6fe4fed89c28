//! lifecycle::context
//!
//! The context handed to module logic during the Initializing phase.
//!
//! # Design
//!
//! The context is the only surface module logic sees: resolved inputs on
//! one side, output declaration on the other. Input reads are defensive:
//! a module may only read references it declared, even if the value
//! happens to sit in the store. Output declaration is idempotent by
//! property name; a later call replaces the earlier one.

use std::collections::HashSet;

use thiserror::Error;

use crate::core::reference::Reference;
use crate::core::types::{ConfigValue, ProducerName, PropertyName, TypeError};
use crate::share::loader::ResolvedInputs;
use crate::share::writer::Output;

/// Errors from context operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The module read a reference it never declared as a required input.
    #[error(
        "module '{module}' read undeclared input '{reference}'; \
         declare it in the module descriptor's requiredInputs first"
    )]
    Undeclared {
        /// The module doing the read.
        module: ProducerName,
        /// The reference that was not declared.
        reference: Reference,
    },

    /// A name passed to the context failed validation.
    #[error(transparent)]
    InvalidName(#[from] TypeError),
}

/// One output as recorded at the deployment-platform level.
///
/// Every `create_output` call records one of these; only shareable ones
/// additionally enter the pending buffer that the writer flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformOutput {
    /// The output's name.
    pub name: PropertyName,
    /// The validated value.
    pub value: ConfigValue,
    /// Whether the output is also shared through the config store.
    pub shareable: bool,
}

/// The synthesis context: resolved inputs in, declared outputs out.
///
/// # Example
///
/// ```
/// use crosswire::lifecycle::SynthContext;
/// use crosswire::core::types::{ConfigValue, ProducerName};
/// use crosswire::share::loader::ResolvedInputs;
///
/// let module = ProducerName::new("net").unwrap();
/// let mut ctx = SynthContext::new(module, ResolvedInputs::default(), Vec::new());
///
/// ctx.create_output("vpcId", ConfigValue::string("vpc-123"), true).unwrap();
/// assert_eq!(ctx.pending_outputs().len(), 1);
/// ```
#[derive(Debug)]
pub struct SynthContext {
    /// The module this context belongs to.
    module: ProducerName,
    /// References the module declared, the only ones it may read.
    declared: HashSet<Reference>,
    /// Values resolved by the loader before logic started.
    inputs: ResolvedInputs,
    /// Shareable outputs awaiting the single end-of-run flush.
    pending: Vec<Output>,
    /// Every output recorded at the platform level, shareable or not.
    platform: Vec<PlatformOutput>,
}

impl SynthContext {
    /// Build a context from resolved inputs and construction-time outputs.
    ///
    /// `initial_outputs` seed the pending buffer (and the platform
    /// record) before module logic runs; logic-phase declarations with
    /// the same name replace them.
    pub fn new(
        module: ProducerName,
        inputs: ResolvedInputs,
        initial_outputs: Vec<Output>,
    ) -> Self {
        let declared = inputs.iter().map(|(r, _)| r.clone()).collect();
        let mut ctx = Self {
            module,
            declared,
            inputs,
            pending: Vec::new(),
            platform: Vec::new(),
        };
        for output in initial_outputs {
            ctx.record(output.property, output.value, true);
        }
        ctx
    }

    /// The module this context belongs to.
    pub fn module(&self) -> &ProducerName {
        &self.module
    }

    /// Read a declared input by producer and property name.
    ///
    /// # Errors
    ///
    /// - [`ContextError::InvalidName`] when the names fail validation
    /// - [`ContextError::Undeclared`] when the module never declared the
    ///   reference as a required input
    pub fn input(&self, producer: &str, property: &str) -> Result<&str, ContextError> {
        let reference = Reference::new(
            ProducerName::new(producer)?,
            PropertyName::new(property)?,
        );
        self.input_ref(&reference)
    }

    /// Read a declared input by parsed reference.
    pub fn input_ref(&self, reference: &Reference) -> Result<&str, ContextError> {
        if !self.declared.contains(reference) {
            return Err(ContextError::Undeclared {
                module: self.module.clone(),
                reference: reference.clone(),
            });
        }
        // The loader validated every declared reference, so a declared
        // reference always resolves.
        self.inputs
            .get(reference)
            .ok_or_else(|| ContextError::Undeclared {
                module: self.module.clone(),
                reference: reference.clone(),
            })
    }

    /// Declare an output.
    ///
    /// Always records the output at the deployment-platform level. When
    /// `shareable` is true, additionally upserts it into the pending
    /// buffer for the end-of-run flush. Idempotent by name: a later call
    /// for the same name replaces the earlier entry, it never appends a
    /// duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidName`] when `name` is not a valid
    /// property name.
    pub fn create_output(
        &mut self,
        name: &str,
        value: ConfigValue,
        shareable: bool,
    ) -> Result<(), ContextError> {
        let property = PropertyName::new(name)?;
        self.record(property, value, shareable);
        Ok(())
    }

    fn record(&mut self, property: PropertyName, value: ConfigValue, shareable: bool) {
        match self.platform.iter_mut().find(|o| o.name == property) {
            Some(existing) => {
                existing.value = value.clone();
                existing.shareable = shareable;
            }
            None => self.platform.push(PlatformOutput {
                name: property.clone(),
                value: value.clone(),
                shareable,
            }),
        }

        if shareable {
            match self.pending.iter_mut().find(|o| o.property == property) {
                Some(existing) => existing.value = value,
                None => self.pending.push(Output::new(property, value)),
            }
        } else {
            // A re-declaration that turned non-shareable withdraws the
            // earlier pending entry.
            self.pending.retain(|o| o.property != property);
        }
    }

    /// The shareable outputs awaiting the flush, in declaration order.
    pub fn pending_outputs(&self) -> &[Output] {
        &self.pending
    }

    /// Every platform-level output recorded so far.
    pub fn platform_outputs(&self) -> &[PlatformOutput] {
        &self.platform
    }

    /// Decompose into (pending buffer, platform records).
    pub fn into_outputs(self) -> (Vec<Output>, Vec<PlatformOutput>) {
        (self.pending, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ValueType;
    use crate::store::StoredValue;

    fn module() -> ProducerName {
        ProducerName::new("net").unwrap()
    }

    fn resolved(entries: &[(&str, &str)]) -> ResolvedInputs {
        let mut inputs = ResolvedInputs::default();
        for (reference, value) in entries {
            inputs.insert_for_test(
                reference.parse().unwrap(),
                StoredValue {
                    value: value.to_string(),
                    value_type: ValueType::String,
                },
            );
        }
        inputs
    }

    #[test]
    fn reads_resolved_declared_input() {
        let ctx = SynthContext::new(
            module(),
            resolved(&[("foundation.createdAt", "2024-01-01T00:00:00Z")]),
            Vec::new(),
        );
        assert_eq!(
            ctx.input("foundation", "createdAt").unwrap(),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn undeclared_read_is_rejected() {
        let ctx = SynthContext::new(module(), ResolvedInputs::default(), Vec::new());
        let err = ctx.input("foundation", "createdAt").unwrap_err();
        assert!(matches!(err, ContextError::Undeclared { .. }));
        assert!(err.to_string().contains("foundation.createdAt"));
        assert!(err.to_string().contains("requiredInputs"));
    }

    #[test]
    fn create_output_records_platform_and_pending() {
        let mut ctx = SynthContext::new(module(), ResolvedInputs::default(), Vec::new());
        ctx.create_output("vpcId", ConfigValue::string("vpc-1"), true)
            .unwrap();
        ctx.create_output("internal", ConfigValue::string("x"), false)
            .unwrap();

        assert_eq!(ctx.pending_outputs().len(), 1);
        assert_eq!(ctx.platform_outputs().len(), 2);
    }

    #[test]
    fn create_output_is_idempotent_by_name() {
        let mut ctx = SynthContext::new(module(), ResolvedInputs::default(), Vec::new());
        ctx.create_output("endpoint", ConfigValue::string("first"), true)
            .unwrap();
        ctx.create_output(
            "endpoint",
            ConfigValue::new(ValueType::Url, "https://second.example.com").unwrap(),
            true,
        )
        .unwrap();

        assert_eq!(ctx.pending_outputs().len(), 1);
        let output = &ctx.pending_outputs()[0];
        assert_eq!(output.value.as_str(), "https://second.example.com");
        assert_eq!(output.value.value_type(), ValueType::Url);
    }

    #[test]
    fn construction_time_outputs_seed_the_buffer() {
        let initial = vec![Output::new(
            PropertyName::new("vpcId").unwrap(),
            ConfigValue::string("vpc-1"),
        )];
        let ctx = SynthContext::new(module(), ResolvedInputs::default(), initial);
        assert_eq!(ctx.pending_outputs().len(), 1);
        assert_eq!(ctx.platform_outputs().len(), 1);
    }

    #[test]
    fn logic_phase_declaration_replaces_construction_time_entry() {
        let initial = vec![Output::new(
            PropertyName::new("vpcId").unwrap(),
            ConfigValue::string("vpc-old"),
        )];
        let mut ctx = SynthContext::new(module(), ResolvedInputs::default(), initial);
        ctx.create_output("vpcId", ConfigValue::string("vpc-new"), true)
            .unwrap();

        assert_eq!(ctx.pending_outputs().len(), 1);
        assert_eq!(ctx.pending_outputs()[0].value.as_str(), "vpc-new");
    }

    #[test]
    fn turning_non_shareable_withdraws_pending_entry() {
        let mut ctx = SynthContext::new(module(), ResolvedInputs::default(), Vec::new());
        ctx.create_output("secretish", ConfigValue::string("v1"), true)
            .unwrap();
        ctx.create_output("secretish", ConfigValue::string("v2"), false)
            .unwrap();

        assert!(ctx.pending_outputs().is_empty());
        assert_eq!(ctx.platform_outputs().len(), 1);
    }

    #[test]
    fn invalid_output_name_rejected() {
        let mut ctx = SynthContext::new(module(), ResolvedInputs::default(), Vec::new());
        let err = ctx
            .create_output("has.dot", ConfigValue::string("v"), true)
            .unwrap_err();
        assert!(matches!(err, ContextError::InvalidName(_)));
    }
}
