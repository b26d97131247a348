// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for export and import.

use linebridge_graph::SceneError;
use thiserror::Error;

/// Fatal document errors
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Document is not valid JSON or lacks a required section
    #[error("Invalid document structure: {0}")]
    Structure(String),

    /// Document version is outside the supported range
    #[error("Unsupported file version: {0}")]
    Version(String),

    /// Document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for document-level operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure to decode one attribute, recorded and skipped
#[derive(Debug, Error)]
pub enum CodecError {
    /// Record has no value for the attribute
    #[error("Missing parameter '{0}'")]
    MissingParam(String),

    /// Wire value has the wrong JSON shape
    #[error("Expected {expected}, got {found}")]
    TypeMismatch {
        /// Expected wire shape
        expected: &'static str,
        /// Received JSON value, abbreviated
        found: String,
    },

    /// Enum ordinal has no declared token
    #[error("No enum item with ordinal {0}")]
    UnknownEnumOrdinal(i64),

    /// Host rejected the write
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl CodecError {
    /// Mismatch error describing the offending value
    pub fn mismatch(expected: &'static str, found: &serde_json::Value) -> Self {
        let mut found = found.to_string();
        if found.len() > 40 {
            let cut = (0..=40).rev().find(|i| found.is_char_boundary(*i)).unwrap_or(0);
            found.truncate(cut);
            found.push_str("...");
        }
        Self::TypeMismatch { expected, found }
    }
}

/// Failure to create one entity, recorded and skipped
#[derive(Debug, Error)]
pub enum CreationError {
    /// Record names a type without a schema
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    /// Record has no node type
    #[error("Record has no node type")]
    MissingType,

    /// Record is not an object with a name
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// Host refused to create the entity
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_abbreviates_long_values() {
        let value = serde_json::Value::String("x".repeat(100));
        let CodecError::TypeMismatch { found, .. } = CodecError::mismatch("number", &value) else {
            panic!("expected a type mismatch");
        };
        assert!(found.ends_with("..."));
        assert!(found.len() <= 43);
    }
}
