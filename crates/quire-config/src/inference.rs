//! Schema inference settings.

use serde::{Deserialize, Serialize};

const fn default_max_depth() -> usize {
    32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct InferenceConfig {
    /// Deepest schema nesting inference will expand.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}
