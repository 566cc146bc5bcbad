//! Schema error types.

use thiserror::Error;

/// Errors from building or inferring a schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Top-level schema types must be named.
    #[error("Schema type is missing a name")]
    Unnamed,

    /// Two top-level types share a name.
    #[error("Duplicate schema type: {0}")]
    DuplicateType(String),

    /// A node breaks the object/array/primitive classification.
    #[error("Invalid shape for '{name}': {reason}")]
    InvalidShape { name: String, reason: String },

    /// Named types reference each other in a loop that inference must expand.
    #[error("Cyclic type reference: {}", .chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    /// Nesting went deeper than the configured limit.
    #[error("Schema nesting exceeds max depth {max_depth} at '{at}'")]
    DepthExceeded { max_depth: usize, at: String },
}
