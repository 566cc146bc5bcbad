//! Cross-cutting error types for Quire.
//!
//! Domain-specific errors (`RuleError`, `SchemaError`, `ValidateError`) live in
//! their respective crates.

use thiserror::Error;

/// Errors that can be raised while handling the shared vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A JSON kind name did not match any known classification.
    #[error("Unknown JSON type: {0}")]
    UnknownJsonType(String),

    /// A severity level name did not match any known level.
    #[error("Unknown level: {0}")]
    UnknownLevel(String),
}
