//! store::http
//!
//! HTTP table-service client for the config store.
//!
//! # Design
//!
//! The store's remote backing is an HTTP table service exposing batched
//! reads and writes per table:
//!
//! ```text
//! POST {base}/tables/{table}/batch-get   { "keys": [{producer, property}] }
//! POST {base}/tables/{table}/batch-put   { "items": [{producer, property, value, type}] }
//! ```
//!
//! The table name is the derived [`StoreIdentity`]; this client never
//! invents one. Authentication is a bearer token read from the
//! environment variable the stage's target names.
//!
//! # Error Mapping
//!
//! - 401 / 403 -> auth errors
//! - 404 -> the table does not exist, i.e. the stage was never bootstrapped
//! - 429 -> throttled (no automatic retry; the run aborts)
//! - other non-2xx -> `StoreError::ApiError` with the service's message

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{
    ConfigKey, ConfigRecord, ConfigStore, StoreError, StoredValue, DEFAULT_READ_LIMIT,
    DEFAULT_WRITE_LIMIT,
};
use crate::core::identity::StoreIdentity;
use crate::core::types::{ProducerName, PropertyName, ValueType};

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "crosswire-cli";

/// HTTP table-service implementation of [`ConfigStore`].
///
/// # Example
///
/// ```ignore
/// use crosswire::store::http::HttpStore;
///
/// let store = HttpStore::new(
///     "https://tables.example.com",
///     identity,
///     Some("token".to_string()),
/// );
/// let found = store.batch_get(&keys).await?;
/// ```
pub struct HttpStore {
    /// HTTP client for making requests.
    client: Client,
    /// Base URL of the table service.
    base_url: String,
    /// Identity of the table this client addresses.
    identity: StoreIdentity,
    /// Bearer token, if the service requires auth.
    token: Option<String>,
}

// Custom Debug to avoid exposing the token.
impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.base_url)
            .field("identity", &self.identity)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

/// Wire form of a key.
#[derive(Debug, Serialize, Deserialize)]
struct WireKey {
    producer: String,
    property: String,
}

/// Wire form of a full item.
#[derive(Debug, Serialize, Deserialize)]
struct WireItem {
    producer: String,
    property: String,
    value: String,
    #[serde(rename = "type")]
    value_type: ValueType,
}

#[derive(Debug, Serialize)]
struct BatchGetRequest<'a> {
    keys: &'a [WireKey],
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    items: Vec<WireItem>,
}

#[derive(Debug, Serialize)]
struct BatchPutRequest<'a> {
    items: &'a [WireItem],
}

/// Error body the table service returns on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl HttpStore {
    /// Create a client for one table-service endpoint and store identity.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Service base URL, without a trailing slash
    /// * `identity` - The derived store identity (names the table)
    /// * `token` - Bearer token, or `None` for unauthenticated services
    pub fn new(
        base_url: impl Into<String>,
        identity: StoreIdentity,
        token: Option<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
            token,
        }
    }

    /// Build the URL for a table operation.
    fn table_url(&self, op: &str) -> String {
        format!(
            "{}/tables/{}/{}",
            self.base_url,
            self.identity.table_name(),
            op
        )
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(ref token) = self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| StoreError::AuthFailed("token contains invalid characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Decode a successful response or map an error status.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| StoreError::ApiError {
                status: status.as_u16(),
                message: format!("failed to parse response: {}", e),
            })
        } else {
            Err(self.map_error_response(response, status).await)
        }
    }

    /// Map a non-2xx response into the StoreError taxonomy.
    async fn map_error_response(&self, response: Response, status: StatusCode) -> StoreError {
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

        match status {
            StatusCode::UNAUTHORIZED => {
                if self.token.is_none() {
                    StoreError::AuthRequired
                } else {
                    StoreError::AuthFailed(message)
                }
            }
            StatusCode::FORBIDDEN => StoreError::AuthFailed(message),
            StatusCode::NOT_FOUND => StoreError::NotProvisioned {
                identity: self.identity.clone(),
            },
            StatusCode::TOO_MANY_REQUESTS => StoreError::Throttled,
            _ => StoreError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl ConfigStore for HttpStore {
    fn identity(&self) -> &StoreIdentity {
        &self.identity
    }

    fn read_limit(&self) -> usize {
        DEFAULT_READ_LIMIT
    }

    fn write_limit(&self) -> usize {
        DEFAULT_WRITE_LIMIT
    }

    async fn batch_get(
        &self,
        keys: &[ConfigKey],
    ) -> Result<HashMap<ConfigKey, StoredValue>, StoreError> {
        let wire_keys: Vec<WireKey> = keys
            .iter()
            .map(|k| WireKey {
                producer: k.producer.as_str().to_string(),
                property: k.property.as_str().to_string(),
            })
            .collect();

        let response = self
            .client
            .post(self.table_url("batch-get"))
            .headers(self.headers()?)
            .json(&BatchGetRequest { keys: &wire_keys })
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let body: BatchGetResponse = self.handle_response(response).await?;

        let mut found = HashMap::with_capacity(body.items.len());
        for item in body.items {
            // Entries written by a foreign tool could carry names this
            // crate's validation rejects; surface that as an API error
            // rather than silently dropping the entry.
            let producer = ProducerName::new(&item.producer).map_err(|e| StoreError::ApiError {
                status: 200,
                message: format!("store returned invalid producer name: {}", e),
            })?;
            let property = PropertyName::new(&item.property).map_err(|e| StoreError::ApiError {
                status: 200,
                message: format!("store returned invalid property name: {}", e),
            })?;
            found.insert(
                ConfigKey::new(producer, property),
                StoredValue {
                    value: item.value,
                    value_type: item.value_type,
                },
            );
        }
        Ok(found)
    }

    async fn batch_put(&self, records: &[ConfigRecord]) -> Result<(), StoreError> {
        let limit = self.write_limit();
        if records.len() > limit {
            return Err(StoreError::BatchTooLarge {
                given: records.len(),
                limit,
            });
        }

        let items: Vec<WireItem> = records
            .iter()
            .map(|r| WireItem {
                producer: r.key.producer.as_str().to_string(),
                property: r.key.property.as_str().to_string(),
                value: r.value.as_str().to_string(),
                value_type: r.value.value_type(),
            })
            .collect();

        let response = self
            .client
            .post(self.table_url("batch-put"))
            .headers(self.headers()?)
            .json(&BatchPutRequest { items: &items })
            .send()
            .await
            .map_err(|e| StoreError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.map_error_response(response, status).await)
        }
    }
}
