//! foundation::http
//!
//! Provisioner backed by the table service's admin API.
//!
//! # Design
//!
//! The same service that stores configuration can create the stage's
//! resources:
//!
//! ```text
//! PUT  {base}/tables/{table}                     ensure the store table
//! POST {base}/resources/keys       { "name" }    ensure a shared key
//! POST {base}/resources/log-sinks  { "name" }    ensure a log sink
//! ```
//!
//! All three calls are ensure-style. The table PUT treats 409 (already
//! exists) as success; the resource endpoints return the existing
//! resource's ARN when called again with the same name. That is what
//! makes the foundation bootstrap safe to re-run.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ProvisionError, Provisioner};
use crate::core::identity::StoreIdentity;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "crosswire-cli";

/// Table-service-backed provisioner.
pub struct HttpProvisioner {
    client: Client,
    base_url: String,
    token: Option<String>,
}

// Custom Debug to avoid exposing the token.
impl std::fmt::Debug for HttpProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvisioner")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct EnsureResourceRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct EnsureResourceResponse {
    arn: String,
}

impl HttpProvisioner {
    /// Create a provisioner for one table-service endpoint.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn headers(&self, resource: &str) -> Result<HeaderMap, ProvisionError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(ref token) = self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ProvisionError::Failed {
                    resource: resource.to_string(),
                    message: "token contains invalid characters".into(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Treat success and already-exists as ensured; anything else fails.
    fn check_ensured(status: StatusCode, resource: &str) -> Result<(), ProvisionError> {
        if status.is_success() || status == StatusCode::CONFLICT {
            Ok(())
        } else {
            Err(ProvisionError::Failed {
                resource: resource.to_string(),
                message: format!("service returned {}", status),
            })
        }
    }

    async fn ensure_resource(
        &self,
        kind: &str,
        name: &str,
    ) -> Result<String, ProvisionError> {
        let url = format!("{}/resources/{}", self.base_url, kind);
        let response = self
            .client
            .post(url)
            .headers(self.headers(name)?)
            .json(&EnsureResourceRequest { name })
            .send()
            .await
            .map_err(|e| ProvisionError::Failed {
                resource: name.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::Failed {
                resource: name.to_string(),
                message: format!("service returned {}", status),
            });
        }
        let body: EnsureResourceResponse =
            response.json().await.map_err(|e| ProvisionError::Failed {
                resource: name.to_string(),
                message: format!("failed to parse response: {}", e),
            })?;
        Ok(body.arn)
    }
}

#[async_trait]
impl Provisioner for HttpProvisioner {
    async fn ensure_store(&self, identity: &StoreIdentity) -> Result<(), ProvisionError> {
        let table = identity.table_name();
        let url = format!("{}/tables/{}", self.base_url, table);
        let response = self
            .client
            .put(url)
            .headers(self.headers(table)?)
            .send()
            .await
            .map_err(|e| ProvisionError::Failed {
                resource: table.to_string(),
                message: e.to_string(),
            })?;
        Self::check_ensured(response.status(), table)
    }

    async fn ensure_shared_key(&self, alias: &str) -> Result<String, ProvisionError> {
        self.ensure_resource("keys", alias).await
    }

    async fn ensure_log_sink(&self, name: &str) -> Result<String, ProvisionError> {
        self.ensure_resource("log-sinks", name).await
    }
}
