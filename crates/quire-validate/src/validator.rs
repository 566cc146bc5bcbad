//! Recursive document walker.

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, join_all};
use quire_config::{QuireConfig, ValidationConfig};
use quire_core::{JsonType, Marker, Path, PathSegment};
use quire_rules::ValidationContext;
use quire_schema::{InferenceOptions, InferredSchema, Schema, SchemaError, SchemaType};
use serde_json::Value;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::ValidateError;

type Markers = Result<Vec<Marker>, ValidateError>;

/// Stand-in for fields missing from a document.
static MISSING: Value = Value::Null;

/// Validates documents against an inferred schema.
///
/// Cheap to clone and safe to share: the schema and the diagnostics
/// collaborator are behind `Arc`s and never mutated.
#[derive(Clone)]
pub struct DocumentValidator {
    schema: Arc<InferredSchema>,
    diagnostics: Arc<dyn Diagnostics>,
    config: ValidationConfig,
}

impl DocumentValidator {
    /// Validator with default settings, reporting through `tracing`.
    #[must_use]
    pub fn new(schema: Arc<InferredSchema>) -> Self {
        Self {
            schema,
            diagnostics: Arc::new(TracingDiagnostics),
            config: ValidationConfig::default(),
        }
    }

    #[must_use]
    pub fn from_config(schema: Arc<InferredSchema>, config: &QuireConfig) -> Self {
        Self::new(schema).with_config(config.validation.clone())
    }

    /// Infer `schema` under the configured limits and build a validator for it.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] raised by inference.
    pub fn compile(schema: &Schema, config: &QuireConfig) -> Result<Self, SchemaError> {
        let options = InferenceOptions::with_max_depth(config.inference.max_depth);
        let inferred = schema.infer_with(&options)?;
        Ok(Self::from_config(Arc::new(inferred), config))
    }

    #[must_use]
    pub fn with_diagnostics(self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            diagnostics,
            ..self
        }
    }

    #[must_use]
    pub fn with_config(self, config: ValidationConfig) -> Self {
        Self { config, ..self }
    }

    #[must_use]
    pub fn schema(&self) -> &InferredSchema {
        &self.schema
    }

    /// Validate a document selected by its `_type`.
    ///
    /// Never fails. An unknown or missing `_type` yields no markers and is
    /// reported to the diagnostics collaborator. Any failure during the walk
    /// discards partial results and yields a single root error marker.
    pub async fn validate_document(&self, document: &Value) -> Vec<Marker> {
        match self.try_validate_document(document).await {
            Ok(markers) => markers,
            Err(error) => {
                self.diagnostics.unexpected_failure(&error);
                vec![Marker::root_error(self.config.internal_error_message.clone())]
            }
        }
    }

    /// Like [`Self::validate_document`], but hands back the failure.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Rule`] when a rule cannot be evaluated and
    /// [`ValidateError::DepthExceeded`] past the configured walk depth.
    pub async fn try_validate_document(&self, document: &Value) -> Markers {
        let type_name = document.get("_type").and_then(Value::as_str);
        let Some(ty) = type_name.and_then(|name| self.schema.get(name)) else {
            self.diagnostics.schema_type_not_found(type_name);
            return Ok(Vec::new());
        };

        // One shared copy; rule contexts point into it.
        let shared = Arc::new(document.clone());
        let markers = self
            .validate_item(
                &shared,
                &shared,
                Some(ty),
                Cursor::root(),
                ValidationContext::root(),
            )
            .await?;
        tracing::debug!(
            type_name = ty.display_name(),
            markers = markers.len(),
            "document validated"
        );
        Ok(markers)
    }

    /// Validate `value` as `ty` at `at`.
    ///
    /// Own rules come before children, children follow declaration order,
    /// whatever order the underlying futures finish in.
    fn validate_item<'a>(
        &'a self,
        document: &'a Arc<Value>,
        value: &'a Value,
        ty: Option<&'a SchemaType>,
        at: Cursor,
        ctx: ValidationContext,
    ) -> BoxFuture<'a, Markers> {
        async move {
            let Some(ty) = ty else {
                return Ok(Vec::new());
            };
            if at.depth > self.config.max_depth {
                return Err(ValidateError::DepthExceeded {
                    max_depth: self.config.max_depth,
                    path: at.path,
                });
            }

            if let Some(target) = self.schema.resolve_reference(ty) {
                let (own, resolved) = future::join(
                    self.run_rules(value, ty, &at.path, &ctx),
                    self.validate_item(document, value, Some(target), at.deeper(), ctx.clone()),
                )
                .await;
                return concat(own?, [resolved]);
            }

            match value {
                Value::Array(items) => {
                    self.validate_array(document, value, items, ty, &at, &ctx)
                        .await
                }
                Value::Object(_) => self.validate_object(document, value, ty, &at, &ctx).await,
                _ => self.run_rules(value, ty, &at.path, &ctx).await,
            }
        }
        .boxed()
    }

    async fn validate_array(
        &self,
        document: &Arc<Value>,
        array: &Value,
        items: &[Value],
        ty: &SchemaType,
        at: &Cursor,
        ctx: &ValidationContext,
    ) -> Markers {
        let candidates = ty.of.as_deref().unwrap_or_default();

        let item_checks = items.iter().enumerate().map(|(index, item)| {
            self.validate_item(
                document,
                item,
                resolve_item_type(item, candidates),
                at.item(item, index),
                ValidationContext::within(Arc::clone(document), at.pointer.clone()),
            )
        });

        let (own, items) =
            future::join(self.run_rules(array, ty, &at.path, ctx), join_all(item_checks)).await;
        concat(own?, items)
    }

    async fn validate_object(
        &self,
        document: &Arc<Value>,
        object: &Value,
        ty: &SchemaType,
        at: &Cursor,
        ctx: &ValidationContext,
    ) -> Markers {
        let field_checks = ty
            .fields
            .iter()
            .flatten()
            .filter(|field| field.ty.validation.is_some())
            .map(|field| {
                self.validate_item(
                    document,
                    object.get(&field.name).unwrap_or(&MISSING),
                    Some(&field.ty),
                    at.field(&field.name),
                    ValidationContext::within(Arc::clone(document), at.pointer.clone()),
                )
            });

        let (own, fields) =
            future::join(self.run_rules(object, ty, &at.path, ctx), join_all(field_checks)).await;
        concat(own?, fields)
    }
    /// Run the node's own rules against `value`, anchored at `path`.
    async fn run_rules(
        &self,
        value: &Value,
        ty: &SchemaType,
        path: &Path,
        ctx: &ValidationContext,
    ) -> Markers {
        let Some(rules) = ty.validation.as_deref() else {
            return Ok(Vec::new());
        };

        let results = join_all(rules.iter().map(|rule| rule.validate(value, ctx))).await;
        let mut markers = Vec::new();
        for findings in results {
            markers.extend(findings?.into_iter().map(|finding| {
                let path = finding.anchored_at(path);
                Marker::validation(finding.level, path, finding.message)
            }));
        }
        Ok(markers)
    }
}

/// Position of a node in the walk: its marker path, its JSON pointer inside
/// the shared document, and its nesting depth.
#[derive(Debug, Clone)]
struct Cursor {
    path: Path,
    pointer: String,
    depth: usize,
}

impl Cursor {
    fn root() -> Self {
        Self {
            path: Path::root(),
            pointer: String::new(),
            depth: 0,
        }
    }

    fn field(&self, name: &str) -> Self {
        let escaped = name.replace('~', "~0").replace('/', "~1");
        Self {
            path: self.path.child(PathSegment::field(name)),
            pointer: format!("{}/{escaped}", self.pointer),
            depth: self.depth + 1,
        }
    }

    fn item(&self, item: &Value, index: usize) -> Self {
        Self {
            path: self.path.child(PathSegment::for_item(item, index)),
            pointer: format!("{}/{index}", self.pointer),
            depth: self.depth + 1,
        }
    }

    /// Same position, one level deeper: a reference delegating to its target.
    fn deeper(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for DocumentValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentValidator")
            .field("types", &self.schema.list())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Pick the candidate an array item is validated as.
///
/// Items without `_type` match the first candidate of their kind. Items with
/// one match a candidate's declared name first, then its referenced type.
fn resolve_item_type<'s>(item: &Value, candidates: &'s [SchemaType]) -> Option<&'s SchemaType> {
    match item.get("_type").and_then(Value::as_str) {
        Some(discriminator) => candidates
            .iter()
            .find(|c| c.name.as_deref() == Some(discriminator))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| c.referenced_type() == Some(discriminator))
            }),
        None => {
            let kind = JsonType::of(item)?;
            candidates.iter().find(|c| c.json_type == kind)
        }
    }
}

/// Append child results in order. The first error in that order wins.
fn concat(mut markers: Vec<Marker>, children: impl IntoIterator<Item = Markers>) -> Markers {
    for child in children {
        markers.extend(child?);
    }
    Ok(markers)
}
