//! # quire-validate
//!
//! Async document validator for Quire.
//!
//! [`DocumentValidator`] walks a document in lock-step with its
//! [`quire_schema::InferredSchema`] type, runs every attached rule, and
//! flattens the findings into path-annotated [`quire_core::Marker`]s:
//!
//! - arrays: the array's own rules, then each item, addressed by `_key` when
//!   present and by index otherwise, validated as the candidate selected by
//!   its `_type` or its kind
//! - objects: the object's own rules, then each field carrying rules
//! - primitives: the node's rules
//!
//! Siblings are evaluated concurrently and joined in declaration order, so the
//! marker list is identical across runs whatever latency custom predicates
//! have. Configuration mismatches and internal failures go to a
//! [`Diagnostics`] collaborator instead of the marker list.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use quire_rules::Rule;
//! use quire_schema::{Field, Schema, SchemaType};
//! use quire_validate::DocumentValidator;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), quire_schema::SchemaError> {
//! let schema = Schema::from_types([SchemaType::object([
//!     Field::new("title", SchemaType::string()).validation(Rule::new().required()),
//! ])
//! .named("post")])?
//! .infer()?;
//!
//! let validator = DocumentValidator::new(Arc::new(schema));
//! let markers = validator
//!     .validate_document(&json!({"_type": "post", "title": ""}))
//!     .await;
//! assert_eq!(markers.len(), 1);
//! # Ok(())
//! # }
//! ```

mod diagnostics;
mod error;
mod query;
mod validator;

pub use diagnostics::{Diagnostics, TracingDiagnostics};
pub use error::ValidateError;
pub use query::MarkerQuery;
pub use validator::DocumentValidator;
