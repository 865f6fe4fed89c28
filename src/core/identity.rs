//! core::identity
//!
//! Stage and store identity derivation.
//!
//! # Design
//!
//! The store instance a run addresses is a pure function of
//! (project prefix, stage). The identity is derived once, up front, and
//! injected into the loader, writer, and lifecycle controller; nothing in
//! this crate reconstructs it from ambient environment state. Every error
//! that mentions the store carries this identity so the user knows exactly
//! which instance was queried.

use serde::{Deserialize, Serialize};

use super::types::StageName;

/// Suffix appended to `<prefix>-<stage>` to form the store's table name.
const STORE_SUFFIX: &str = "config";

/// The deterministic identity of one config store instance.
///
/// Formatted as `<prefix>-<stage>-config`. Two runs with the same prefix
/// and stage always address the same store.
///
/// # Example
///
/// ```
/// use crosswire::core::identity::StoreIdentity;
/// use crosswire::core::types::StageName;
///
/// let stage = StageName::new("dev").unwrap();
/// let id = StoreIdentity::derive("acme", &stage);
/// assert_eq!(id.table_name(), "acme-dev-config");
/// assert_eq!(id.stage().as_str(), "dev");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreIdentity {
    prefix: String,
    stage: StageName,
    table_name: String,
}

impl StoreIdentity {
    /// Derive the store identity for a (prefix, stage) pair.
    pub fn derive(prefix: impl Into<String>, stage: &StageName) -> Self {
        let prefix = prefix.into();
        let table_name = format!("{}-{}-{}", prefix, stage, STORE_SUFFIX);
        Self {
            prefix,
            stage: stage.clone(),
            table_name,
        }
    }

    /// The project prefix this identity was derived from.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The stage this identity was derived from.
    pub fn stage(&self) -> &StageName {
        &self.stage
    }

    /// The backing table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

impl std::fmt::Display for StoreIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.table_name)
    }
}

/// The target a stage deploys into.
///
/// Supplies the account/region/endpoint tuple that determines where the
/// store instance lives, plus the name of the environment variable holding
/// the access token. Resolution of these values (from the tool config) is
/// the stage/target resolver's job; this type only carries the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetIdentity {
    /// Account identifier within the hosting platform.
    pub account: String,
    /// Region the stage's resources live in.
    pub region: String,
    /// Base URL of the table service endpoint.
    pub endpoint: String,
    /// Environment variable naming the access token, if auth is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

/// A stage plus the target it addresses.
///
/// This is the unit the CLI resolves before constructing a store client:
/// the stage name picks the `[stage.<name>]` table in the tool config, and
/// the target it contains decides which endpoint and credentials to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDescriptor {
    /// The stage name.
    pub name: StageName,
    /// The resolved deployment target.
    pub target: TargetIdentity,
}

impl StageDescriptor {
    /// Derive the store identity this stage addresses for a project prefix.
    pub fn store_identity(&self, prefix: &str) -> StoreIdentity {
        StoreIdentity::derive(prefix, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str) -> StageName {
        StageName::new(name).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = StoreIdentity::derive("acme", &stage("dev"));
        let b = StoreIdentity::derive("acme", &stage("dev"));
        assert_eq!(a, b);
        assert_eq!(a.table_name(), "acme-dev-config");
    }

    #[test]
    fn different_stages_differ() {
        let dev = StoreIdentity::derive("acme", &stage("dev"));
        let prod = StoreIdentity::derive("acme", &stage("prod"));
        assert_ne!(dev.table_name(), prod.table_name());
    }

    #[test]
    fn display_is_table_name() {
        let id = StoreIdentity::derive("acme", &stage("qa"));
        assert_eq!(format!("{}", id), "acme-qa-config");
    }

    #[test]
    fn stage_descriptor_derives_store_identity() {
        let descriptor = StageDescriptor {
            name: stage("dev"),
            target: TargetIdentity {
                account: "123456789012".into(),
                region: "us-east-1".into(),
                endpoint: "https://tables.example.com".into(),
                token_env: Some("CROSSWIRE_TOKEN".into()),
            },
        };
        assert_eq!(
            descriptor.store_identity("acme").table_name(),
            "acme-dev-config"
        );
    }

    #[test]
    fn target_identity_serde_omits_absent_token() {
        let target = TargetIdentity {
            account: "1".into(),
            region: "r".into(),
            endpoint: "https://e".into(),
            token_env: None,
        };
        let json = serde_json::to_string(&target).unwrap();
        assert!(!json.contains("token_env"));
    }
}
