//! # quire-schema
//!
//! Schema type model, registry, and rule inference for Quire.
//!
//! Authors describe document types as a tree of [`SchemaType`] nodes: objects
//! with [`Field`]s, arrays with candidate item types (`of`), and primitive
//! leaves. Validation is attached through [`RuleSpec`], either a ready
//! [`quire_rules::Rule`] merged onto the inferred default or a function that
//! derives the final rule from it.
//!
//! [`Schema::infer`] turns the raw registry into an [`InferredSchema`] whose
//! nodes carry resolved rule lists, ready for the document validator.

pub mod error;
pub mod infer;
pub mod registry;
pub mod types;

pub use error::SchemaError;
pub use infer::InferenceOptions;
pub use registry::{InferredSchema, Schema};
pub use types::{Field, NodeKind, RuleSpec, SchemaType};
