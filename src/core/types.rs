//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ProducerName`] - Validated name of a configuration-producing module
//! - [`PropertyName`] - Validated name of a single published property
//! - [`StageName`] - Validated deployment stage name
//! - [`ValueType`] - Closed set of value interpretation tags
//! - [`ConfigValue`] - Tagged value validated per variant at construction
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs: a
//! [`PropertyName`] can never contain a dot (it could be written but never
//! referenced back), and a [`ConfigValue`] tagged `number` always parses
//! as a number.
//!
//! # Examples
//!
//! ```
//! use crosswire::core::types::{ProducerName, PropertyName, ValueType, ConfigValue};
//!
//! let producer = ProducerName::new("foundation").unwrap();
//! let property = PropertyName::new("createdAt").unwrap();
//! let value = ConfigValue::new(ValueType::Number, "42").unwrap();
//!
//! // Invalid constructions fail at creation time
//! assert!(PropertyName::new("has.dot").is_err());
//! assert!(ConfigValue::new(ValueType::Number, "not-a-number").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid producer name: {0}")]
    InvalidProducerName(String),

    #[error("invalid property name: {0}")]
    InvalidPropertyName(String),

    #[error("invalid stage name: {0}")]
    InvalidStageName(String),

    #[error("unknown value type '{0}', expected one of: string, arn, url, number, json")]
    UnknownValueType(String),

    #[error("invalid {value_type} value: {message}")]
    InvalidValue {
        value_type: ValueType,
        message: String,
    },
}

/// A validated producer (module) name.
///
/// Producer names key the partition side of the store and may contain
/// dots; reference parsing accounts for that by splitting on the *last*
/// dot. The rules are deliberately loose:
/// - Cannot be empty
/// - Cannot contain whitespace or ASCII control characters
///
/// # Example
///
/// ```
/// use crosswire::core::types::ProducerName;
///
/// let name = ProducerName::new("data.ingest").unwrap();
/// assert_eq!(name.as_str(), "data.ingest");
///
/// assert!(ProducerName::new("").is_err());
/// assert!(ProducerName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProducerName(String);

impl ProducerName {
    /// Create a new validated producer name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidProducerName` if the name is empty or
    /// contains whitespace or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidProducerName(
                "producer name cannot be empty".into(),
            ));
        }
        for c in name.chars() {
            if c.is_whitespace() {
                return Err(TypeError::InvalidProducerName(
                    "producer name cannot contain whitespace".into(),
                ));
            }
            if c.is_ascii_control() {
                return Err(TypeError::InvalidProducerName(
                    "producer name cannot contain control characters".into(),
                ));
            }
        }
        Ok(Self(name))
    }

    /// Get the producer name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProducerName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ProducerName> for String {
    fn from(name: ProducerName) -> Self {
        name.0
    }
}

impl AsRef<str> for ProducerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProducerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated property name.
///
/// Property names key the sort side of the store. Unlike producer names
/// they must not contain a dot: the reference grammar splits
/// `"producer.property"` on the last dot, so a dotted property could be
/// written but never read back. Failing at declaration time is strictly
/// better than a guaranteed missing-config error later.
///
/// # Example
///
/// ```
/// use crosswire::core::types::PropertyName;
///
/// let name = PropertyName::new("vpcId").unwrap();
/// assert_eq!(name.as_str(), "vpcId");
///
/// assert!(PropertyName::new("").is_err());
/// assert!(PropertyName::new("nested.name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyName(String);

impl PropertyName {
    /// Create a new validated property name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPropertyName` if the name is empty,
    /// contains a dot, or contains whitespace or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidPropertyName(
                "property name cannot be empty".into(),
            ));
        }
        if name.contains('.') {
            return Err(TypeError::InvalidPropertyName(format!(
                "property name '{name}' cannot contain '.' (it could never be referenced)"
            )));
        }
        for c in name.chars() {
            if c.is_whitespace() {
                return Err(TypeError::InvalidPropertyName(
                    "property name cannot contain whitespace".into(),
                ));
            }
            if c.is_ascii_control() {
                return Err(TypeError::InvalidPropertyName(
                    "property name cannot contain control characters".into(),
                ));
            }
        }
        Ok(Self(name))
    }

    /// Get the property name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PropertyName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PropertyName> for String {
    fn from(name: PropertyName) -> Self {
        name.0
    }
}

impl AsRef<str> for PropertyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated deployment stage name.
///
/// Stage names become part of deterministic resource identities
/// (`<prefix>-<stage>-config`), so they are restricted:
/// - Cannot be empty
/// - Must start with a lowercase letter
/// - May contain lowercase letters, digits, and `-`
///
/// # Example
///
/// ```
/// use crosswire::core::types::StageName;
///
/// let stage = StageName::new("dev").unwrap();
/// assert_eq!(stage.as_str(), "dev");
///
/// assert!(StageName::new("Prod").is_err());
/// assert!(StageName::new("2east").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageName(String);

impl StageName {
    /// Create a new validated stage name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidStageName` if the name violates the
    /// stage naming rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let first = match name.chars().next() {
            Some(c) => c,
            None => {
                return Err(TypeError::InvalidStageName(
                    "stage name cannot be empty".into(),
                ))
            }
        };
        if !first.is_ascii_lowercase() {
            return Err(TypeError::InvalidStageName(
                "stage name must start with a lowercase letter".into(),
            ));
        }
        for c in name.chars() {
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
                return Err(TypeError::InvalidStageName(format!(
                    "stage name cannot contain '{c}'"
                )));
            }
        }
        Ok(Self(name))
    }

    /// Get the stage name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StageName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<StageName> for String {
    fn from(name: StageName) -> Self {
        name.0
    }
}

impl AsRef<str> for StageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How callers should interpret a stored value.
///
/// This is a closed set; free-text type tags are rejected at parse time.
/// The tag travels with the value through the store and the descriptor
/// file, but decoding is always left to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Opaque string, no further structure.
    String,
    /// Amazon-style resource name (`arn:` prefix).
    Arn,
    /// Absolute URL.
    Url,
    /// Decimal number (stored as its string rendering).
    Number,
    /// Arbitrary JSON document (stored serialized).
    Json,
}

impl ValueType {
    /// All members of the closed set, in declaration order.
    pub const ALL: [ValueType; 5] = [
        ValueType::String,
        ValueType::Arn,
        ValueType::Url,
        ValueType::Number,
        ValueType::Json,
    ];

    /// The wire tag for this value type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Arn => "arn",
            ValueType::Url => "url",
            ValueType::Number => "number",
            ValueType::Json => "json",
        }
    }
}

impl std::str::FromStr for ValueType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "arn" => Ok(ValueType::Arn),
            "url" => Ok(ValueType::Url),
            "number" => Ok(ValueType::Number),
            "json" => Ok(ValueType::Json),
            other => Err(TypeError::UnknownValueType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configuration value tagged with its interpretation.
///
/// The payload is always carried as a string (that is what the store
/// persists), but each variant validates its payload at construction:
/// numbers must parse, JSON must parse, URLs must parse, ARNs must carry
/// the `arn:` prefix. A `ConfigValue` that exists is a value the writer
/// may persist without further checks.
///
/// # Example
///
/// ```
/// use crosswire::core::types::{ConfigValue, ValueType};
///
/// let v = ConfigValue::new(ValueType::Json, r#"{"a": 1}"#).unwrap();
/// assert_eq!(v.value_type(), ValueType::Json);
/// assert_eq!(v.as_str(), r#"{"a": 1}"#);
///
/// assert!(ConfigValue::new(ValueType::Url, "not a url").is_err());
/// assert!(ConfigValue::new(ValueType::Arn, "ec2:instance/i-0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Arn(String),
    Url(String),
    Number(String),
    Json(String),
}

impl ConfigValue {
    /// Construct a value of the given type, validating the payload.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidValue` when the payload does not satisfy
    /// the variant's validation rule.
    pub fn new(value_type: ValueType, raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        match value_type {
            ValueType::String => Ok(ConfigValue::String(raw)),
            ValueType::Arn => {
                if !raw.starts_with("arn:") {
                    return Err(TypeError::InvalidValue {
                        value_type,
                        message: format!("'{raw}' does not start with 'arn:'"),
                    });
                }
                Ok(ConfigValue::Arn(raw))
            }
            ValueType::Url => {
                url::Url::parse(&raw).map_err(|e| TypeError::InvalidValue {
                    value_type,
                    message: format!("'{raw}': {e}"),
                })?;
                Ok(ConfigValue::Url(raw))
            }
            ValueType::Number => {
                raw.parse::<f64>().map_err(|e| TypeError::InvalidValue {
                    value_type,
                    message: format!("'{raw}': {e}"),
                })?;
                Ok(ConfigValue::Number(raw))
            }
            ValueType::Json => {
                serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| {
                    TypeError::InvalidValue {
                        value_type,
                        message: e.to_string(),
                    }
                })?;
                Ok(ConfigValue::Json(raw))
            }
        }
    }

    /// Shorthand for a string value (always valid).
    pub fn string(raw: impl Into<String>) -> Self {
        ConfigValue::String(raw.into())
    }

    /// The type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigValue::String(_) => ValueType::String,
            ConfigValue::Arn(_) => ValueType::Arn,
            ConfigValue::Url(_) => ValueType::Url,
            ConfigValue::Number(_) => ValueType::Number,
            ConfigValue::Json(_) => ValueType::Json,
        }
    }

    /// The raw string payload, exactly as it will be persisted.
    pub fn as_str(&self) -> &str {
        match self {
            ConfigValue::String(s)
            | ConfigValue::Arn(s)
            | ConfigValue::Url(s)
            | ConfigValue::Number(s)
            | ConfigValue::Json(s) => s,
        }
    }

    /// Consume the value, returning the raw payload.
    pub fn into_raw(self) -> String {
        match self {
            ConfigValue::String(s)
            | ConfigValue::Arn(s)
            | ConfigValue::Url(s)
            | ConfigValue::Number(s)
            | ConfigValue::Json(s) => s,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A UTC timestamp in RFC3339 format.
///
/// # Example
///
/// ```
/// use crosswire::core::types::UtcTimestamp;
///
/// let now = UtcTimestamp::now();
/// println!("Current time: {}", now);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from a chrono DateTime.
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt)
    }

    /// Get the underlying datetime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }

    /// Render as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
