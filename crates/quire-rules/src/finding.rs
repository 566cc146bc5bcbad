//! Raw rule findings and the evaluation context.

use std::sync::Arc;

use quire_core::{Level, Path, PathSegment};
use serde_json::Value;

/// A finding produced by a single rule, before the walker anchors it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFinding {
    pub level: Level,
    pub message: String,
    /// Path relative to the value the rule was run against.
    pub path: Option<Path>,
}

impl RuleFinding {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            path: None,
        }
    }

    /// Finding reported into a sub-structure of the validated value.
    pub fn at(level: Level, path: Path, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            path: Some(path),
        }
    }

    /// Push `segment` in front of the relative path.
    #[must_use]
    pub fn nested_under(self, segment: PathSegment) -> Self {
        let head = Path::root().child(segment);
        let path = match self.path {
            Some(rest) => head.join(&rest),
            None => head,
        };
        Self {
            path: Some(path),
            ..self
        }
    }

    /// Absolute path of this finding given the path of the validated value.
    #[must_use]
    pub fn anchored_at(&self, base: &Path) -> Path {
        match &self.path {
            Some(relative) => base.join(relative),
            None => base.clone(),
        }
    }
}

/// Context handed to every rule evaluation.
///
/// Holds the whole document behind an `Arc` and the JSON pointer of the
/// enclosing value, so cloning a context is cheap and async predicates can
/// own one.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    document: Option<Arc<Value>>,
    parent: String,
}

impl ValidationContext {
    /// Context for a value with no enclosing object or array.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            document: None,
            parent: String::new(),
        }
    }

    /// Context whose parent is `parent` itself.
    #[must_use]
    pub const fn with_parent(parent: Arc<Value>) -> Self {
        Self {
            document: Some(parent),
            parent: String::new(),
        }
    }

    /// Context whose parent sits at JSON pointer `pointer` inside `document`.
    #[must_use]
    pub fn within(document: Arc<Value>, pointer: impl Into<String>) -> Self {
        Self {
            document: Some(document),
            parent: pointer.into(),
        }
    }

    /// The enclosing object or array, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Value> {
        self.document.as_deref()?.pointer(&self.parent)
    }

    /// A sibling field of the validated value.
    #[must_use]
    pub fn sibling(&self, name: &str) -> Option<&Value> {
        self.parent().and_then(|parent| parent.get(name))
    }
}
