//! Registries of named schema types.
//!
//! `Schema` holds the raw, author-defined types. `InferredSchema` holds the
//! same types after inference and is immutable: share it behind an `Arc`.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::infer::{InferenceOptions, Inferrer};
use crate::types::SchemaType;

/// Raw schema: named types in registration order.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: Vec<SchemaType>,
    index: HashMap<String, usize>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from named types.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unnamed`] or [`SchemaError::DuplicateType`].
    pub fn from_types(types: impl IntoIterator<Item = SchemaType>) -> Result<Self, SchemaError> {
        let mut schema = Self::new();
        for ty in types {
            schema.register(ty)?;
        }
        Ok(schema)
    }

    /// Register a named type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unnamed`] if the type has no name, or
    /// [`SchemaError::DuplicateType`] if the name is taken.
    pub fn register(&mut self, ty: SchemaType) -> Result<(), SchemaError> {
        let name = ty.name.clone().ok_or(SchemaError::Unnamed)?;
        if self.index.contains_key(&name) {
            return Err(SchemaError::DuplicateType(name));
        }
        self.index.insert(name, self.types.len());
        self.types.push(ty);
        Ok(())
    }

    /// Get a type by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Registered type names, in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.types.iter().filter_map(|t| t.name.as_deref()).collect()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub(crate) fn types(&self) -> &[SchemaType] {
        &self.types
    }

    /// Attach rules to every type with the default options.
    ///
    /// # Errors
    ///
    /// See [`Schema::infer_with`].
    pub fn infer(&self) -> Result<InferredSchema, SchemaError> {
        self.infer_with(&InferenceOptions::default())
    }

    /// Attach rules to every type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidShape`] for malformed nodes,
    /// [`SchemaError::CyclicReference`] when named array types contain each
    /// other, and [`SchemaError::DepthExceeded`] past `options.max_depth`.
    pub fn infer_with(&self, options: &InferenceOptions) -> Result<InferredSchema, SchemaError> {
        let types = Inferrer::new(self, options).infer_all()?;
        tracing::debug!(types = types.len(), "schema inferred");
        Ok(InferredSchema {
            types,
            index: self.index.clone(),
        })
    }
}

/// Schema with rules attached to every node. Read-only after inference.
#[derive(Debug, Clone)]
pub struct InferredSchema {
    types: Vec<SchemaType>,
    index: HashMap<String, usize>,
}

impl InferredSchema {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaType> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.types.iter().filter_map(|t| t.name.as_deref()).collect()
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// The registered type a shapeless node points at through `type_name`.
    ///
    /// Nodes with their own `fields` or `of`, and nodes pointing at
    /// themselves, resolve to nothing.
    #[must_use]
    pub fn resolve_reference<'a>(&'a self, ty: &'a SchemaType) -> Option<&'a SchemaType> {
        if ty.fields.is_some() || ty.of.is_some() {
            return None;
        }
        let target = self.get(ty.referenced_type()?)?;
        (!std::ptr::eq(target, ty)).then_some(target)
    }
}
