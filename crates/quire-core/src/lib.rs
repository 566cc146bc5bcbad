//! # quire-core
//!
//! Core types shared by every Quire crate.
//!
//! This crate provides the vocabulary that rules, schemas and the document
//! validator agree on:
//! - `JsonType`: closed classification of document values
//! - `Level`: severity of a validation finding
//! - `PathSegment` / `Path`: addresses inside a document
//! - `Marker`: the flat validation finding handed to editors and tooling
//! - Cross-cutting error types

pub mod errors;
pub mod kinds;
pub mod marker;
pub mod path;

pub use errors::CoreError;
pub use kinds::{JsonType, Level};
pub use marker::{Marker, MarkerItem, MarkerKind};
pub use path::{Path, PathSegment};
