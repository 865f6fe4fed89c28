//! core::reference
//!
//! The `"producer.property"` reference syntax consumed by the loader.
//!
//! # Grammar
//!
//! A reference is a producer name and a property name joined by a dot.
//! Producer names may themselves contain dots, so parsing splits on the
//! **last** dot:
//!
//! ```text
//! "foundation.createdAt"   -> ("foundation", "createdAt")
//! "data.ingest.bucketArn"  -> ("data.ingest", "bucketArn")
//! "noproperty"             -> parse error (no dot)
//! "trailing."              -> parse error (nothing after the dot)
//! ```
//!
//! Parsing happens before any I/O; a malformed reference never reaches
//! the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{ProducerName, PropertyName, TypeError};

/// Errors from reference parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The reference has no dot separating producer from property.
    #[error("malformed reference '{0}': expected '<producer>.<property>'")]
    MissingSeparator(String),

    /// The reference ends with its final dot, leaving no property.
    #[error("malformed reference '{0}': nothing after the final '.'")]
    EmptyProperty(String),

    /// One side of the reference failed name validation.
    #[error("malformed reference '{reference}': {source}")]
    InvalidName {
        reference: String,
        source: TypeError,
    },
}

/// A parsed `"producer.property"` reference.
///
/// # Example
///
/// ```
/// use crosswire::core::reference::Reference;
///
/// let r: Reference = "data.ingest.bucketArn".parse().unwrap();
/// assert_eq!(r.producer().as_str(), "data.ingest");
/// assert_eq!(r.property().as_str(), "bucketArn");
/// assert_eq!(r.to_string(), "data.ingest.bucketArn");
///
/// assert!("noproperty".parse::<Reference>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference {
    producer: ProducerName,
    property: PropertyName,
}

impl Reference {
    /// Build a reference from already-validated parts.
    pub fn new(producer: ProducerName, property: PropertyName) -> Self {
        Self { producer, property }
    }

    /// Parse a reference string, splitting on the last dot.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MissingSeparator`] when the string has no dot
    /// - [`ParseError::EmptyProperty`] when nothing follows the final dot
    /// - [`ParseError::InvalidName`] when either side fails name validation
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let dot = raw
            .rfind('.')
            .ok_or_else(|| ParseError::MissingSeparator(raw.to_string()))?;
        let (producer_part, property_part) = raw.split_at(dot);
        let property_part = &property_part[1..];
        if property_part.is_empty() {
            return Err(ParseError::EmptyProperty(raw.to_string()));
        }
        let producer = ProducerName::new(producer_part).map_err(|source| {
            ParseError::InvalidName {
                reference: raw.to_string(),
                source,
            }
        })?;
        let property = PropertyName::new(property_part).map_err(|source| {
            ParseError::InvalidName {
                reference: raw.to_string(),
                source,
            }
        })?;
        Ok(Self { producer, property })
    }

    /// The producer side of the reference.
    pub fn producer(&self) -> &ProducerName {
        &self.producer
    }

    /// The property side of the reference.
    pub fn property(&self) -> &PropertyName {
        &self.property
    }

    /// Decompose into (producer, property).
    pub fn into_parts(self) -> (ProducerName, PropertyName) {
        (self.producer, self.property)
    }
}

impl std::str::FromStr for Reference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Reference {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.producer, self.property)
    }
}
