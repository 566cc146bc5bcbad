//! # quire-rules
//!
//! The constraint unit of Quire.
//!
//! A [`Rule`] is an immutable value describing zero or more checks. Rules are
//! built from kind constructors (`Rule::string()`, `Rule::object()`, ...) and
//! chainable combinators (`required`, `valid`, `keys`, `items`, `either`,
//! length and numeric bounds, patterns, custom predicates), and combined with
//! [`Rule::merge`], where the merged-in rule wins on overlapping checks.
//!
//! Evaluation is asynchronous: [`Rule::validate`] resolves to the list of
//! [`RuleFinding`]s, in a deterministic order, or to a [`RuleError`] when a
//! custom predicate fails.
//!
//! ```
//! use quire_rules::{Rule, ValidationContext};
//! use serde_json::json;
//!
//! let rule = Rule::string().required().max_length(5);
//! let findings = futures::executor::block_on(
//!     rule.validate(&json!("too long"), &ValidationContext::root()),
//! )
//! .unwrap();
//! assert_eq!(findings.len(), 1);
//! ```

mod constraint;
mod custom;
mod error;
mod finding;
mod rule;

pub use custom::{CustomCheck, Verdict};
pub use error::RuleError;
pub use finding::{RuleFinding, ValidationContext};
pub use rule::Rule;
