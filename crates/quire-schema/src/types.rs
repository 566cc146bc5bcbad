//! Schema type model.
//!
//! A `SchemaType` is object-like when it has `fields`, array-like when it has
//! `of`, and a primitive leaf otherwise. Only the shape is serializable;
//! rules are attached in code.

use std::fmt;
use std::sync::Arc;

use quire_core::JsonType;
use quire_rules::Rule;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// RuleSpec
// ---------------------------------------------------------------------------

type Customizer = dyn Fn(Rule) -> Rule + Send + Sync;

/// Author-declared validation, resolved once during inference.
#[derive(Clone)]
pub enum RuleSpec {
    /// A ready rule, merged onto the inferred default.
    Prebuilt(Rule),
    /// Builds the final rule from the inferred default. It may discard it.
    Derived(Arc<Customizer>),
}

impl RuleSpec {
    pub fn derived<F>(customize: F) -> Self
    where
        F: Fn(Rule) -> Rule + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(customize))
    }

    /// Resolve against the default rule for the node.
    #[must_use]
    pub fn resolve(&self, base: Rule) -> Rule {
        match self {
            Self::Prebuilt(rule) => base.merge(rule),
            Self::Derived(customize) => customize(base),
        }
    }
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        Self::Prebuilt(rule)
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prebuilt(rule) => f.debug_tuple("Prebuilt").field(rule).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaType
// ---------------------------------------------------------------------------

/// Structural classification of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Primitive,
}

/// A node in the schema tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    /// Declared name. Absent for anonymous inline types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name of the type this node refers to, e.g. `person` for an `author` item.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    pub json_type: JsonType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,

    /// Candidate item types of an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<Vec<SchemaType>>,

    /// Author type-level validation.
    #[serde(skip)]
    pub rules: Option<RuleSpec>,

    /// Rules attached by inference. `None` on raw schemas and on nodes the
    /// validator can skip entirely.
    #[serde(skip)]
    pub validation: Option<Vec<Rule>>,
}

impl SchemaType {
    /// Anonymous primitive leaf.
    #[must_use]
    pub const fn primitive(json_type: JsonType) -> Self {
        Self {
            name: None,
            type_name: None,
            json_type,
            fields: None,
            of: None,
            rules: None,
            validation: None,
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::primitive(JsonType::String)
    }

    #[must_use]
    pub const fn number() -> Self {
        Self::primitive(JsonType::Number)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::primitive(JsonType::Boolean)
    }

    /// Anonymous object type with the given fields.
    #[must_use]
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: Some(fields.into_iter().collect()),
            ..Self::primitive(JsonType::Object)
        }
    }

    /// Anonymous array type accepting the given candidate item types.
    #[must_use]
    pub fn array(of: impl IntoIterator<Item = Self>) -> Self {
        Self {
            of: Some(of.into_iter().collect()),
            ..Self::primitive(JsonType::Array)
        }
    }

    /// A node standing for the registered type `type_name`.
    ///
    /// Its kind is filled in from the registry during inference.
    #[must_use]
    pub fn reference(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::primitive(JsonType::Object)
        }
    }

    #[must_use]
    pub fn named(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    #[must_use]
    pub fn of_type(self, type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..self
        }
    }

    /// Attach author type-level validation.
    #[must_use]
    pub fn rules(self, spec: impl Into<RuleSpec>) -> Self {
        Self {
            rules: Some(spec.into()),
            ..self
        }
    }

    #[must_use]
    pub const fn node_kind(&self) -> NodeKind {
        if self.fields.is_some() {
            NodeKind::Object
        } else if self.of.is_some() {
            NodeKind::Array
        } else {
            NodeKind::Primitive
        }
    }

    /// Name used in messages: the declared name, else the referenced type.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.type_name.as_deref())
            .unwrap_or("(anonymous)")
    }

    /// The type this node refers to.
    ///
    /// A `type` equal to the node's own json type (`{"type": "object",
    /// "jsonType": "object"}`) names the built-in kind, not a registered type.
    #[must_use]
    pub fn referenced_type(&self) -> Option<&str> {
        self.type_name
            .as_deref()
            .filter(|type_name| *type_name != self.json_type.as_str())
    }

    /// Values an item's `_type` may take to select this candidate.
    #[must_use]
    pub fn discriminators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name.iter().cloned().collect();
        if let Some(type_name) = self.referenced_type() {
            if !names.iter().any(|name| name == type_name) {
                names.push(type_name.to_string());
            }
        }
        names
    }

    /// An object type with neither a name nor a referenced type.
    #[must_use]
    pub fn is_anonymous_object(&self) -> bool {
        self.json_type == JsonType::Object && self.name.is_none() && self.referenced_type().is_none()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.as_ref()?.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.as_mut()?.iter_mut().find(|f| f.name == name)
    }

    /// Whether any child node carries a validation list.
    #[must_use]
    pub fn has_nested_validation(&self) -> bool {
        let in_fields = self
            .fields
            .iter()
            .flatten()
            .any(|f| f.ty.validation.is_some());
        let in_candidates = self
            .of
            .iter()
            .flatten()
            .any(|c| c.validation.is_some() || c.has_nested_validation());
        in_fields || in_candidates
    }

    /// Check the object/array/primitive invariant for this node.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidShape`] when `fields` and `of` are mixed
    /// or disagree with `json_type`.
    pub fn check_shape(&self) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidShape {
            name: self.display_name().to_string(),
            reason: reason.to_string(),
        };
        match (&self.fields, &self.of) {
            (Some(_), Some(_)) => Err(invalid("has both fields and of")),
            (Some(_), None) if self.json_type != JsonType::Object => {
                Err(invalid("fields require json type object"))
            }
            (None, Some(_)) if self.json_type != JsonType::Array => {
                Err(invalid("of requires json type array"))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A named field of an object type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SchemaType,
    /// Author-declared field validation.
    #[serde(skip)]
    pub validation: Option<RuleSpec>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            ty,
            validation: None,
        }
    }

    #[must_use]
    pub fn validation(self, spec: impl Into<RuleSpec>) -> Self {
        Self {
            validation: Some(spec.into()),
            ..self
        }
    }
}
