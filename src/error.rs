//! Error types for ogc-schema
//!
//! This module defines all error types used throughout the library.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ogc-schema operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value or element is not a member of a closed variant group
    #[error("unsupported variant for {group}: {found}")]
    UnsupportedVariant {
        /// Name of the variant group (substitution group or choice)
        group: &'static str,
        /// The offending element name or variant
        found: String,
    },

    /// Operation intentionally not provided by this crate
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A required metadata key is absent
    #[error("missing metadata '{key}' (alias '{alias}')")]
    MissingMetadata {
        /// Metadata key
        key: String,
        /// Alternative name of the key
        alias: String,
    },

    /// A metadata key is defined twice with different values
    #[error("ambiguous metadata '{key}' (alias '{alias}')")]
    AmbiguousMetadata {
        /// Metadata key
        key: String,
        /// Alternative name of the key
        alias: String,
    },

    /// A spatial operator received a geometry it does not accept
    #[error("{operator} does not accept {found}")]
    MalformedGeometry {
        /// Operator element name
        operator: String,
        /// The rejected operand
        found: String,
    },

    /// Decoding error (XML to model)
    #[error("decoding error: {0}")]
    Decode(#[from] DecodeError),

    /// Encoding error (model to XML)
    #[error("encoding error: {0}")]
    Encode(String),

    /// XML syntax error
    #[error("XML error: {0}")]
    Xml(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Value error (invalid lexical value)
    #[error("value error: {0}")]
    Value(String),

    /// Two objects share one gml:id within a document
    #[error("duplicate gml:id '{0}'")]
    DuplicateId(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for an [`Error::UnsupportedVariant`]
    pub fn unsupported_variant(group: &'static str, found: impl Into<String>) -> Self {
        Error::UnsupportedVariant {
            group,
            found: found.into(),
        }
    }

    /// Shorthand for a plain decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode(DecodeError::new(message))
    }
}

/// Failure to map an XML element onto a model type
#[derive(Debug, Clone)]
pub struct DecodeError {
    /// Error message
    pub message: String,
    /// Name of the element being decoded
    pub element: Option<String>,
    /// Underlying reason
    pub reason: Option<String>,
}

impl DecodeError {
    /// Create a new decode error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            reason: None,
        }
    }

    /// Set the element being decoded
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (in {})", element)?;
        }

        if let Some(ref reason) = self.reason {
            write!(f, ": {}", reason)?;
        }

        Ok(())
    }
}

impl std::error::Error for DecodeError {}
