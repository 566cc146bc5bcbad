//! Document validation settings.

use serde::{Deserialize, Serialize};

/// Deepest document nesting the validator will walk.
const fn default_max_depth() -> usize {
    64
}

fn default_internal_error_message() -> String {
    "An unexpected error occurred while validating the document".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Walks deeper than this fail with an internal error marker.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Message of the root marker reported when validation itself fails.
    #[serde(default = "default_internal_error_message")]
    pub internal_error_message: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            internal_error_message: default_internal_error_message(),
        }
    }
}
