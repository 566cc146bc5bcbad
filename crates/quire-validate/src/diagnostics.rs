//! Out-of-band reporting for conditions that are not validation findings.

use crate::error::ValidateError;

/// Receives configuration mismatches and unexpected failures.
///
/// Passed to the validator at construction; nothing here ends up in the
/// marker output.
pub trait Diagnostics: Send + Sync {
    /// The document's `_type` is missing or names no registered type.
    fn schema_type_not_found(&self, type_name: Option<&str>);

    /// Validation failed and was replaced by a root error marker.
    fn unexpected_failure(&self, error: &ValidateError);
}

/// Default collaborator: emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn schema_type_not_found(&self, type_name: Option<&str>) {
        tracing::warn!(
            type_name = type_name.unwrap_or("<missing>"),
            "schema type not found, skipping document"
        );
    }

    fn unexpected_failure(&self, error: &ValidateError) {
        tracing::error!(error = %error, detail = ?error, "document validation failed");
    }
}
