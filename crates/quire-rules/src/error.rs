//! Rule error types.

use thiserror::Error;

/// Errors raised while building or evaluating a rule.
///
/// Validation findings are never errors: they come back as `RuleFinding`s.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A string pattern did not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A custom predicate failed instead of returning a verdict.
    #[error("Rule '{rule}' failed: {source}")]
    Predicate {
        rule: String,
        #[source]
        source: anyhow::Error,
    },
}
