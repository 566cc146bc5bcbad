//! Validator error types.

use quire_core::Path;
use quire_rules::RuleError;
use thiserror::Error;

/// Failures that abort a validation run.
///
/// Never reach callers of `validate_document`: they are reported to the
/// diagnostics collaborator and replaced by a single root marker.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A rule could not be evaluated, typically a failing custom predicate.
    #[error("Rule evaluation failed: {0}")]
    Rule(#[from] RuleError),

    /// The document is nested deeper than the configured walk limit.
    #[error("Document nesting exceeds max depth {max_depth} at {path}")]
    DepthExceeded { max_depth: usize, path: Path },
}
