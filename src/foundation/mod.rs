//! foundation
//!
//! The foundation bootstrap: the distinguished first module per stage.
//!
//! # Design
//!
//! Before any ordinary module can run, the stage needs its config store
//! and the shared cross-cutting resources (a shared cryptographic key
//! and a shared log sink). The foundation module provisions them through
//! a [`Provisioner`] capability - the provisioning mechanism itself is
//! external - and then publishes their identifiers as ordinary outputs
//! under producer name `foundation`, through the same writer contract
//! every other module uses.
//!
//! # Idempotence
//!
//! Re-running the bootstrap for a stage must not duplicate anything.
//! Every provisioned resource gets a deterministic, stage-scoped
//! identity (`<prefix>-<stage>-shared-key`, `<prefix>-<stage>-logs`, the
//! store's own table name), so `ensure_*` calls converge on the existing
//! resources and the republished outputs overwrite in place.

pub mod http;

pub use http::HttpProvisioner;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::descriptor::ModuleDescriptor;
use crate::core::identity::StoreIdentity;
use crate::core::types::{ConfigValue, ProducerName, UtcTimestamp, ValueType};
use crate::lifecycle::{ModuleLogic, SynthContext};

/// Producer name the foundation publishes under.
pub const FOUNDATION_PRODUCER: &str = "foundation";

/// Errors from provisioning operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The provisioning backend rejected or failed the request.
    #[error("provisioning failed for '{resource}': {message}")]
    Failed {
        /// The resource being provisioned.
        resource: String,
        /// What went wrong.
        message: String,
    },
}

/// External provisioning capability.
///
/// Implementations create (or find, on re-runs) the stage's shared
/// resources. Each method must be safe to call repeatedly for the same
/// identity: the names passed in are deterministic, and the contract is
/// ensure-style, not create-style.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Ensure the config store's backing table exists.
    async fn ensure_store(&self, identity: &StoreIdentity) -> Result<(), ProvisionError>;

    /// Ensure the stage's shared cryptographic key exists.
    ///
    /// Returns the key's ARN.
    async fn ensure_shared_key(&self, alias: &str) -> Result<String, ProvisionError>;

    /// Ensure the stage's shared log sink exists.
    ///
    /// Returns the sink's ARN.
    async fn ensure_log_sink(&self, name: &str) -> Result<String, ProvisionError>;
}

/// Deterministic alias for a stage's shared key.
pub fn shared_key_alias(identity: &StoreIdentity) -> String {
    format!("{}-{}-shared-key", identity.prefix(), identity.stage())
}

/// Deterministic name for a stage's shared log sink.
pub fn log_sink_name(identity: &StoreIdentity) -> String {
    format!("{}-{}-logs", identity.prefix(), identity.stage())
}

/// The foundation module.
///
/// Drive it through the ordinary lifecycle runner:
///
/// ```ignore
/// let foundation = FoundationModule::new(provisioner, identity.clone());
/// let handle = ModuleHandle::ephemeral(foundation_descriptor());
/// let outcome = runner.run(&handle, &foundation, Vec::new()).await?;
/// ```
pub struct FoundationModule<P> {
    provisioner: P,
    identity: StoreIdentity,
}

impl<P: Provisioner> FoundationModule<P> {
    /// Create the foundation module for one stage's store identity.
    pub fn new(provisioner: P, identity: StoreIdentity) -> Self {
        Self {
            provisioner,
            identity,
        }
    }
}

/// The foundation's descriptor.
///
/// The schema is fixed in code, so the descriptor is ephemeral - no
/// local file mirrors it.
pub fn foundation_descriptor() -> ModuleDescriptor {
    let name =
        ProducerName::new(FOUNDATION_PRODUCER).expect("foundation producer name is valid");
    ModuleDescriptor::new(
        name,
        "stage foundation: config store and shared resources",
        "crosswire",
    )
}

#[async_trait]
impl<P: Provisioner> ModuleLogic for FoundationModule<P> {
    async fn initialize(&self, ctx: &mut SynthContext) -> anyhow::Result<()> {
        self.provisioner.ensure_store(&self.identity).await?;

        let key_arn = self
            .provisioner
            .ensure_shared_key(&shared_key_alias(&self.identity))
            .await?;
        let sink_arn = self
            .provisioner
            .ensure_log_sink(&log_sink_name(&self.identity))
            .await?;

        ctx.create_output(
            "configTableName",
            ConfigValue::string(self.identity.table_name()),
            true,
        )?;
        ctx.create_output("sharedKeyArn", ConfigValue::new(ValueType::Arn, key_arn)?, true)?;
        ctx.create_output("logSinkArn", ConfigValue::new(ValueType::Arn, sink_arn)?, true)?;
        ctx.create_output(
            "createdAt",
            ConfigValue::string(UtcTimestamp::now().to_rfc3339()),
            true,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::core::types::{PropertyName, StageName};
    use crate::lifecycle::{ModuleHandle, ModuleRunner};
    use crate::store::mock::MockStore;
    use crate::store::ConfigKey;
    use crate::ui::output::Verbosity;

    fn identity() -> StoreIdentity {
        StoreIdentity::derive("acme", &StageName::new("dev").unwrap())
    }

    /// Provisioner double that records calls and returns deterministic ARNs.
    #[derive(Clone, Default)]
    struct RecordingProvisioner {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Provisioner for RecordingProvisioner {
        async fn ensure_store(&self, identity: &StoreIdentity) -> Result<(), ProvisionError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("store:{}", identity.table_name()));
            Ok(())
        }

        async fn ensure_shared_key(&self, alias: &str) -> Result<String, ProvisionError> {
            self.calls.lock().unwrap().push(format!("key:{alias}"));
            Ok(format!("arn:aws:kms:us-east-1:123456789012:alias/{alias}"))
        }

        async fn ensure_log_sink(&self, name: &str) -> Result<String, ProvisionError> {
            self.calls.lock().unwrap().push(format!("sink:{name}"));
            Ok(format!("arn:aws:logs:us-east-1:123456789012:log-group:{name}"))
        }
    }

    fn foundation_key(property: &str) -> ConfigKey {
        ConfigKey::new(
            ProducerName::new(FOUNDATION_PRODUCER).unwrap(),
            PropertyName::new(property).unwrap(),
        )
    }

    #[tokio::test]
    async fn bootstrap_publishes_foundation_outputs() {
        let store = MockStore::new(identity());
        let provisioner = RecordingProvisioner::default();
        let module = FoundationModule::new(provisioner.clone(), identity());
        let handle = ModuleHandle::ephemeral(foundation_descriptor());

        let runner = ModuleRunner::new(&store, Verbosity::Quiet);
        let outcome = runner.run(&handle, &module, Vec::new()).await.unwrap();

        assert_eq!(outcome.report.entries, 4);
        assert_eq!(
            store.entry(&foundation_key("configTableName")).unwrap().value,
            "acme-dev-config"
        );
        let key_arn = store.entry(&foundation_key("sharedKeyArn")).unwrap();
        assert!(key_arn.value.contains("acme-dev-shared-key"));
        let sink_arn = store.entry(&foundation_key("logSinkArn")).unwrap();
        assert!(sink_arn.value.contains("acme-dev-logs"));
        assert!(store.entry(&foundation_key("createdAt")).is_some());

        let calls = provisioner.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "store:acme-dev-config".to_string(),
                "key:acme-dev-shared-key".to_string(),
                "sink:acme-dev-logs".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn rerun_overwrites_instead_of_duplicating() {
        let store = MockStore::new(identity());
        let provisioner = RecordingProvisioner::default();
        let module = FoundationModule::new(provisioner, identity());
        let handle = ModuleHandle::ephemeral(foundation_descriptor());
        let runner = ModuleRunner::new(&store, Verbosity::Quiet);

        runner.run(&handle, &module, Vec::new()).await.unwrap();
        let first_count = store.len();
        runner.run(&handle, &module, Vec::new()).await.unwrap();

        assert_eq!(store.len(), first_count);
    }

    #[tokio::test]
    async fn provisioning_failure_aborts_before_any_write() {
        struct FailingProvisioner;

        #[async_trait]
        impl Provisioner for FailingProvisioner {
            async fn ensure_store(&self, identity: &StoreIdentity) -> Result<(), ProvisionError> {
                Err(ProvisionError::Failed {
                    resource: identity.table_name().to_string(),
                    message: "permission denied".into(),
                })
            }

            async fn ensure_shared_key(&self, _: &str) -> Result<String, ProvisionError> {
                unreachable!("store provisioning failed first")
            }

            async fn ensure_log_sink(&self, _: &str) -> Result<String, ProvisionError> {
                unreachable!("store provisioning failed first")
            }
        }

        let store = MockStore::new(identity());
        let module = FoundationModule::new(FailingProvisioner, identity());
        let handle = ModuleHandle::ephemeral(foundation_descriptor());
        let runner = ModuleRunner::new(&store, Verbosity::Quiet);

        let err = runner.run(&handle, &module, Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert!(store.operations().is_empty());
    }

    #[test]
    fn deterministic_resource_names() {
        let id = identity();
        assert_eq!(shared_key_alias(&id), "acme-dev-shared-key");
        assert_eq!(log_sink_name(&id), "acme-dev-logs");
        // Same identity, same names, every time.
        assert_eq!(shared_key_alias(&id), shared_key_alias(&identity()));
    }

    #[test]
    fn descriptor_uses_the_reserved_producer_name() {
        let d = foundation_descriptor();
        assert_eq!(d.module_name.as_str(), "foundation");
        assert!(d.required_inputs.is_empty());
    }
}
