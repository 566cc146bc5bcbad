//! Validation markers.
//!
//! A `Marker` is the only output of a validation run. It owns its data and
//! holds no reference back into the document or the schema. The serialized
//! shape is consumed by editors:
//!
//! ```json
//! {"type": "validation", "level": "error", "path": ["items", {"_key": "b"}, "title"], "item": {"message": "Required"}}
//! ```

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use crate::kinds::Level;
use crate::path::Path;

/// Marker discriminator. Validation is the only kind produced by the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    Validation,
}

/// Error payload carried by a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MarkerItem {
    /// Human-readable description of the finding.
    pub message: String,
}

/// A single validation finding tied to a document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Marker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub level: Level,
    pub path: Path,
    pub item: MarkerItem,
}

impl Marker {
    /// Build a validation marker.
    pub fn validation(level: Level, path: Path, message: impl Into<String>) -> Self {
        Self {
            kind: MarkerKind::Validation,
            level,
            path,
            item: MarkerItem {
                message: message.into(),
            },
        }
    }

    /// Error-level marker at the document root.
    pub fn root_error(message: impl Into<String>) -> Self {
        Self::validation(Level::Error, Path::root(), message)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.item.message
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// JSON Schema describing the serialized marker shape, for editor tooling.
///
/// # Panics
///
/// Panics if `serde_json::to_value` fails on the `schemars` output, which
/// always produces JSON-serialisable schemas.
#[must_use]
pub fn marker_json_schema() -> serde_json::Value {
    serde_json::to_value(schema_for!(Marker)).expect("marker schema should serialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn marker_serializes_in_editor_shape() {
        let marker = Marker::validation(
            Level::Warning,
            Path::root().child("items").child(PathSegment::key("b")),
            "Looks odd",
        );

        assert_eq!(
            serde_json::to_value(&marker).unwrap(),
            json!({
                "type": "validation",
                "level": "warning",
                "path": ["items", {"_key": "b"}],
                "item": {"message": "Looks odd"}
            })
        );
    }

    #[test]
    fn root_error_has_empty_path() {
        let marker = Marker::root_error("boom");
        assert!(marker.path.is_root());
        assert!(marker.is_error());
        assert_eq!(marker.message(), "boom");
    }
}
