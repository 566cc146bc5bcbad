//! The `Rule` value type.

use std::future::Future;

use futures::future::{BoxFuture, FutureExt, join_all};
use quire_core::{JsonType, Level};
use regex::Regex;
use serde_json::Value;

use crate::constraint::{Constraint, collect_in_order};
use crate::custom::{CustomCheck, Verdict};
use crate::error::RuleError;
use crate::finding::{RuleFinding, ValidationContext};

/// An immutable, composable description of zero or more value checks.
///
/// Combinators consume the rule and return a new one; clone first to keep
/// the original. A rule never changes once built, so the same rule can be
/// attached to any number of fields and evaluated concurrently.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    kind: Option<JsonType>,
    level: Option<Level>,
    constraints: Vec<Constraint>,
}

impl Rule {
    /// A generic rule with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule bound to `kind`: present values of another kind are rejected.
    #[must_use]
    pub const fn of_kind(kind: JsonType) -> Self {
        Self {
            kind: Some(kind),
            level: None,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::of_kind(JsonType::String)
    }

    #[must_use]
    pub const fn number() -> Self {
        Self::of_kind(JsonType::Number)
    }

    #[must_use]
    pub const fn boolean() -> Self {
        Self::of_kind(JsonType::Boolean)
    }

    #[must_use]
    pub const fn object() -> Self {
        Self::of_kind(JsonType::Object)
    }

    #[must_use]
    pub const fn array() -> Self {
        Self::of_kind(JsonType::Array)
    }

    /// Default rule for a primitive classification.
    #[must_use]
    pub const fn for_kind(kind: JsonType) -> Self {
        match kind {
            JsonType::String => Self::string(),
            JsonType::Number => Self::number(),
            JsonType::Boolean => Self::boolean(),
            JsonType::Object => Self::object(),
            JsonType::Array => Self::array(),
        }
    }

    /// Passes when at least one of `alternatives` passes.
    #[must_use]
    pub fn either(alternatives: impl IntoIterator<Item = Self>) -> Self {
        Self::new().with(Constraint::Either(alternatives.into_iter().collect()))
    }

    // -- combinators --------------------------------------------------------

    /// Value must be present: not null, not an empty string, not an empty array.
    #[must_use]
    pub fn required(self) -> Self {
        self.with(Constraint::Required)
    }

    /// Value must equal one of `values`.
    #[must_use]
    pub fn valid<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with(Constraint::Valid(values.into_iter().map(Into::into).collect()))
    }

    /// Per-key rules for an object value. Findings are reported under the key.
    #[must_use]
    pub fn keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        self.with(Constraint::Keys(
            keys.into_iter().map(|(k, rule)| (k.into(), rule)).collect(),
        ))
    }

    /// Rule every array item must satisfy. Findings are reported under the item.
    #[must_use]
    pub fn items(self, rule: Self) -> Self {
        self.with(Constraint::Items(Box::new(rule)))
    }

    /// Minimum string length (in characters) or array length.
    #[must_use]
    pub fn min_length(self, len: usize) -> Self {
        self.with(Constraint::MinLength(len))
    }

    /// Maximum string length (in characters) or array length.
    #[must_use]
    pub fn max_length(self, len: usize) -> Self {
        self.with(Constraint::MaxLength(len))
    }

    #[must_use]
    pub fn length(self, len: usize) -> Self {
        self.with(Constraint::Length(len))
    }

    #[must_use]
    pub fn min(self, min: f64) -> Self {
        self.with(Constraint::Min(min))
    }

    #[must_use]
    pub fn max(self, max: f64) -> Self {
        self.with(Constraint::Max(max))
    }

    /// String values must match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if the pattern does not compile.
    pub fn pattern(self, pattern: &str) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.regex(regex))
    }

    /// String values must match an already compiled pattern.
    #[must_use]
    pub fn regex(self, regex: Regex) -> Self {
        self.with(Constraint::Pattern(regex))
    }

    /// Attach a synchronous predicate.
    #[must_use]
    pub fn custom<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &ValidationContext) -> anyhow::Result<Verdict> + Send + Sync + 'static,
    {
        self.check(CustomCheck::sync(predicate))
    }

    /// Attach an asynchronous predicate.
    #[must_use]
    pub fn custom_async<F, Fut>(self, predicate: F) -> Self
    where
        F: Fn(Value, ValidationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Verdict>> + Send + 'static,
    {
        self.check(CustomCheck::from_async(predicate))
    }

    /// Attach a prebuilt (possibly named) custom check.
    #[must_use]
    pub fn check(self, check: CustomCheck) -> Self {
        self.with(Constraint::Custom(check))
    }

    /// Report this rule's own findings as errors (the default).
    #[must_use]
    pub fn error(self) -> Self {
        Self {
            level: Some(Level::Error),
            ..self
        }
    }

    #[must_use]
    pub fn warning(self) -> Self {
        Self {
            level: Some(Level::Warning),
            ..self
        }
    }

    #[must_use]
    pub fn info(self) -> Self {
        Self {
            level: Some(Level::Info),
            ..self
        }
    }

    /// Combine two rules. `other` wins on every overlapping constraint, its
    /// kind and level win when set, and everything else is kept in order.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = Self {
            kind: other.kind.or(self.kind),
            level: other.level.or(self.level),
            constraints: self.constraints.clone(),
        };
        for constraint in &other.constraints {
            merged.put(constraint.clone());
        }
        merged
    }

    /// Merge with an optional rule. Absence is the identity.
    #[must_use]
    pub fn merge_opt(&self, other: Option<&Self>) -> Self {
        other.map_or_else(|| self.clone(), |other| self.merge(other))
    }

    // -- introspection ------------------------------------------------------

    #[must_use]
    pub const fn kind(&self) -> Option<JsonType> {
        self.kind
    }

    /// Level applied to this rule's own findings.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level.unwrap_or_default()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required))
    }

    /// Names of the attached constraints, in evaluation order.
    #[must_use]
    pub fn check_names(&self) -> Vec<&'static str> {
        self.constraints.iter().map(Constraint::name).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.constraints.is_empty()
    }

    // -- evaluation ---------------------------------------------------------

    /// Evaluate every check against `value`.
    ///
    /// A kind mismatch short-circuits into a single finding. Otherwise all
    /// constraints run concurrently and their findings are concatenated in
    /// constraint order, whatever order they complete in.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Predicate`] when a custom predicate fails.
    pub fn validate<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a ValidationContext,
    ) -> BoxFuture<'a, Result<Vec<RuleFinding>, RuleError>> {
        async move {
            let level = self.level();

            if let (Some(expected), Some(actual)) = (self.kind, JsonType::of(value)) {
                if expected != actual {
                    return Ok(vec![RuleFinding::new(
                        level,
                        format!("Expected type \"{expected}\", got \"{actual}\""),
                    )]);
                }
            }

            let checks = self
                .constraints
                .iter()
                .map(|constraint| constraint.evaluate(value, ctx, level));
            collect_in_order(join_all(checks).await)
        }
        .boxed()
    }

    fn with(mut self, constraint: Constraint) -> Self {
        self.put(constraint);
        self
    }

    /// Replace the constraint occupying the same slot, or append.
    fn put(&mut self, constraint: Constraint) {
        match self.constraints.iter_mut().find(|c| c.same_slot(&constraint)) {
            Some(slot) => *slot = constraint,
            None => self.constraints.push(constraint),
        }
    }
}
