//! Error types for xsd-classgen
//!
//! This module defines all error types used throughout the library.
//! Only failures that stop a phase are errors; unresolved type names,
//! unsupported facets and unnamed builders are reported through other
//! channels (see [`crate::schema::TypeRef`] and [`crate::renderers`]).

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsd-classgen operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema parsing error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A named reference that matched nothing was dereferenced
    #[error("unresolved reference: '{0}'")]
    UnresolvedReference(String),

    /// An instance element has no declaration in the schema
    #[error("element '{0}' is not declared in the schema")]
    UndeclaredElement(String),

    /// Value error (invalid value for a setting or attribute)
    #[error("value error: {0}")]
    Value(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML reading error
    #[error("XML error: {0}")]
    Xml(String),
}

/// Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("Unexpected root element 'root'")
            .with_location("schema.xsd")
            .with_source("<root/>");

        let msg = format!("{}", err);
        assert!(msg.contains("Unexpected root element"));
        assert!(msg.contains("Location:"));
        assert!(msg.contains("Source:"));
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ParseError::new("test").into();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_reference_errors_display() {
        let err = Error::UnresolvedReference("tns:Missing".to_string());
        assert_eq!(err.to_string(), "unresolved reference: 'tns:Missing'");

        let err = Error::UndeclaredElement("stray".to_string());
        assert!(err.to_string().contains("'stray'"));
    }
}
