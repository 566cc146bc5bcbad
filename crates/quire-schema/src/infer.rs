//! Schema inference: attach a resolved rule list to every node.
//!
//! Runs once per schema. Fields get the default rule of their kind merged
//! with (or replaced through) the author's declaration, arrays get a
//! structural rule describing their allowed items, and every nested shape is
//! annotated before its parent.

use std::collections::HashMap;

use quire_core::JsonType;
use quire_rules::Rule;

use crate::error::SchemaError;
use crate::registry::Schema;
use crate::types::{Field, NodeKind, SchemaType};

/// Default nesting limit for inference.
const DEFAULT_MAX_DEPTH: usize = 32;

/// Inference knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Deepest nesting level inference will descend to.
    pub max_depth: usize,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl InferenceOptions {
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

pub(crate) struct Inferrer<'a> {
    schema: &'a Schema,
    max_depth: usize,
    /// Registered types currently being expanded, outermost first.
    visiting: Vec<String>,
    /// Expanded registered array types, keyed by type name.
    arrays: HashMap<String, (SchemaType, Rule)>,
}

impl<'a> Inferrer<'a> {
    pub(crate) fn new(schema: &'a Schema, options: &InferenceOptions) -> Self {
        Self {
            schema,
            max_depth: options.max_depth,
            visiting: Vec::new(),
            arrays: HashMap::new(),
        }
    }

    pub(crate) fn infer_all(mut self) -> Result<Vec<SchemaType>, SchemaError> {
        let schema = self.schema;
        schema
            .types()
            .iter()
            .map(|ty| {
                self.visiting.push(ty.display_name().to_string());
                let inferred = self.infer_type(ty, 0);
                self.visiting.pop();
                inferred
            })
            .collect()
    }

    fn enter(&self, ty: &SchemaType, depth: usize) -> Result<(), SchemaError> {
        if depth > self.max_depth {
            return Err(SchemaError::DepthExceeded {
                max_depth: self.max_depth,
                at: ty.display_name().to_string(),
            });
        }
        ty.check_shape()
    }

    fn infer_type(&mut self, ty: &SchemaType, depth: usize) -> Result<SchemaType, SchemaError> {
        self.enter(ty, depth)?;
        match ty.node_kind() {
            NodeKind::Array => self.infer_array(ty, depth).map(|(inferred, _)| inferred),
            NodeKind::Object => self.infer_object(ty, depth),
            NodeKind::Primitive => self.infer_leaf(ty),
        }
    }

    /// Leaf nodes only get their own type-level rule. References take the
    /// kind of the type at the end of their reference chain.
    fn infer_leaf(&self, ty: &SchemaType) -> Result<SchemaType, SchemaError> {
        let mut inferred = shell(ty);
        if let Some(target) = self.registered_target(ty)? {
            inferred.json_type = target.json_type;
        }
        inferred.validation = ty
            .rules
            .as_ref()
            .map(|spec| vec![spec.resolve(Rule::for_kind(inferred.json_type))]);
        Ok(inferred)
    }

    fn infer_object(&mut self, ty: &SchemaType, depth: usize) -> Result<SchemaType, SchemaError> {
        let fields = ty
            .fields
            .iter()
            .flatten()
            .map(|field| self.infer_field(field, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;

        let mut inferred = shell(ty);
        inferred.fields = Some(fields);
        inferred.validation = ty
            .rules
            .as_ref()
            .map(|spec| vec![spec.resolve(Rule::new())]);
        Ok(inferred)
    }

    fn infer_field(&mut self, field: &Field, depth: usize) -> Result<Field, SchemaError> {
        let mut ty = self.infer_type(&field.ty, depth)?;
        let mut rules = ty.validation.take().unwrap_or_default();

        if let Some(spec) = &field.validation {
            // The node's own last rule is folded into the field default so
            // the value is kind-checked once.
            let own = rules.pop();
            let base = Rule::for_kind(ty.json_type).merge_opt(own.as_ref());
            rules.push(spec.resolve(base));
        }

        let traverse = !rules.is_empty()
            || ty.has_nested_validation()
            || self.registered_target(&field.ty)?.is_some();
        ty.validation = traverse.then_some(rules);

        Ok(Field {
            name: field.name.clone(),
            ty,
            validation: field.validation.clone(),
        })
    }

    /// Returns the inferred array node and its own rule.
    fn infer_array(
        &mut self,
        ty: &SchemaType,
        depth: usize,
    ) -> Result<(SchemaType, Rule), SchemaError> {
        self.enter(ty, depth)?;

        let candidates = ty.of.as_deref().unwrap_or_default();
        let mut inferred_of = Vec::with_capacity(candidates.len());
        let mut candidate_rules = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let (inferred, rule) = self.infer_candidate(candidate, depth + 1)?;
            inferred_of.push(inferred);
            candidate_rules.push(rule);
        }

        let structural = match candidate_rules.len() {
            0 => Rule::array(),
            1 => Rule::array().items(candidate_rules.remove(0)),
            _ => Rule::array().items(Rule::either(candidate_rules)),
        };
        let own = match &ty.rules {
            Some(spec) => spec.resolve(structural),
            None => structural,
        };

        let mut inferred = shell(ty);
        inferred.of = Some(inferred_of);
        inferred.validation = Some(vec![own.clone()]);
        Ok((inferred, own))
    }

    /// Infer an array candidate and build the rule an item must meet to be
    /// accepted as that candidate.
    fn infer_candidate(
        &mut self,
        candidate: &SchemaType,
        depth: usize,
    ) -> Result<(SchemaType, Rule), SchemaError> {
        // Anonymous objects only get a presence check.
        if candidate.is_anonymous_object() && candidate.node_kind() != NodeKind::Array {
            let inferred = self.infer_type(candidate, depth)?;
            return Ok((inferred, Rule::object().required()));
        }

        // Arrays of arrays. The item rule carries the whole nested structure,
        // so the candidate node is only kept for traversal.
        if candidate.node_kind() == NodeKind::Array {
            let (mut inferred, rule) = self.infer_array(candidate, depth)?;
            inferred.validation = None;
            return Ok((inferred, rule));
        }

        let mut inferred = self.infer_type(candidate, depth)?;
        let target = self.registered_candidate(candidate)?;
        let kind = target.map_or(inferred.json_type, |t| t.json_type);

        let rule = match kind {
            JsonType::Array => match target {
                Some(target) if target.of.is_some() => {
                    let (expanded, rule) = self.registered_array(target, depth)?;
                    // Inline the registered candidates so the walker does not
                    // run the registered array rule a second time.
                    inferred.json_type = JsonType::Array;
                    inferred.of = expanded.of;
                    inferred.validation = None;
                    rule
                }
                _ => Rule::array().required(),
            },
            JsonType::Object => Rule::object().keys([(
                "_type",
                Rule::string().valid(candidate.discriminators()),
            )]),
            primitive => Rule::for_kind(primitive).required(),
        };
        Ok((inferred, rule))
    }

    /// Inferred node and own rule of a registered array type, expanded at
    /// most once.
    fn registered_array(
        &mut self,
        target: &SchemaType,
        depth: usize,
    ) -> Result<(SchemaType, Rule), SchemaError> {
        let name = target.display_name().to_string();
        if let Some(expanded) = self.arrays.get(&name) {
            return Ok(expanded.clone());
        }
        if self.visiting.contains(&name) {
            let mut chain = self.visiting.clone();
            chain.push(name);
            return Err(SchemaError::CyclicReference { chain });
        }

        self.visiting.push(name.clone());
        let expanded = self.infer_array(target, depth + 1);
        self.visiting.pop();

        let expanded = expanded?;
        self.arrays.insert(name, expanded.clone());
        Ok(expanded)
    }

    /// Registered type a shapeless node ends up at, following references
    /// between registered types until one declares its own shape.
    fn registered_target(&self, ty: &SchemaType) -> Result<Option<&'a SchemaType>, SchemaError> {
        match self.next_hop(ty) {
            Some(target) => self.follow(target).map(Some),
            None => Ok(None),
        }
    }

    /// Registered type an array candidate resolves to, by referenced type
    /// first and declared name second.
    fn registered_candidate(
        &self,
        candidate: &SchemaType,
    ) -> Result<Option<&'a SchemaType>, SchemaError> {
        if let Some(target) = self.registered_target(candidate)? {
            return Ok(Some(target));
        }
        let by_name = candidate
            .name
            .as_deref()
            .and_then(|name| self.schema.get(name))
            .filter(|target| !std::ptr::eq(*target, candidate));
        by_name.map(|target| self.follow(target)).transpose()
    }

    fn follow(&self, mut target: &'a SchemaType) -> Result<&'a SchemaType, SchemaError> {
        let mut chain = vec![target.display_name().to_string()];
        while let Some(next) = self.next_hop(target) {
            let name = next.display_name().to_string();
            let seen = chain.contains(&name);
            chain.push(name);
            if seen {
                return Err(SchemaError::CyclicReference { chain });
            }
            target = next;
        }
        Ok(target)
    }

    /// The registered type a shapeless node names directly.
    fn next_hop(&self, ty: &SchemaType) -> Option<&'a SchemaType> {
        if ty.fields.is_some() || ty.of.is_some() {
            return None;
        }
        self.schema.get(ty.referenced_type()?)
    }
}

/// Copy of a node without its children or attached rules.
fn shell(ty: &SchemaType) -> SchemaType {
    SchemaType {
        name: ty.name.clone(),
        type_name: ty.type_name.clone(),
        json_type: ty.json_type,
        fields: None,
        of: None,
        rules: ty.rules.clone(),
        validation: None,
    }
}
