//! The individual checks a rule is made of.

use std::mem;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, join_all};
use quire_core::{Level, PathSegment};
use regex::Regex;
use serde_json::Value;

use crate::custom::{CustomCheck, Verdict};
use crate::error::RuleError;
use crate::finding::{RuleFinding, ValidationContext};
use crate::rule::Rule;

pub(crate) type Findings = Result<Vec<RuleFinding>, RuleError>;

#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    Required,
    Valid(Vec<Value>),
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    Min(f64),
    Max(f64),
    Pattern(Regex),
    Keys(Vec<(String, Rule)>),
    Items(Box<Rule>),
    Either(Vec<Rule>),
    Custom(CustomCheck),
}

impl Constraint {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Valid(_) => "valid",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Length(_) => "length",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Pattern(_) => "pattern",
            Self::Keys(_) => "keys",
            Self::Items(_) => "items",
            Self::Either(_) => "either",
            Self::Custom(_) => "custom",
        }
    }

    /// Whether `other` overrides `self` when merged.
    pub(crate) fn same_slot(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => a.same_slot(b),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }

    pub(crate) fn evaluate<'a>(
        &'a self,
        value: &'a Value,
        ctx: &'a ValidationContext,
        level: Level,
    ) -> BoxFuture<'a, Findings> {
        async move {
            if let Self::Custom(check) = self {
                return run_custom(check, value, ctx, level).await;
            }
            if let Self::Required = self {
                return Ok(finding_if(is_absent(value), level, "Required"));
            }
            if value.is_null() {
                return Ok(Vec::new());
            }

            match self {
                Self::Valid(allowed) => Ok(finding_if(
                    !allowed.contains(value),
                    level,
                    format!("Value must be one of: {}", list_values(allowed)),
                )),
                Self::MinLength(min) => Ok(length_of(value)
                    .filter(|len| len < min)
                    .map(|_| RuleFinding::new(level, too_short(value, *min)))
                    .into_iter()
                    .collect()),
                Self::MaxLength(max) => Ok(length_of(value)
                    .filter(|len| len > max)
                    .map(|_| RuleFinding::new(level, too_long(value, *max)))
                    .into_iter()
                    .collect()),
                Self::Length(exact) => Ok(length_of(value)
                    .filter(|len| len != exact)
                    .map(|_| RuleFinding::new(level, format!("Must be exactly {exact} long")))
                    .into_iter()
                    .collect()),
                Self::Min(min) => Ok(value
                    .as_f64()
                    .filter(|n| n < min)
                    .map(|_| {
                        RuleFinding::new(level, format!("Must be greater than or equal to {min}"))
                    })
                    .into_iter()
                    .collect()),
                Self::Max(max) => Ok(value
                    .as_f64()
                    .filter(|n| n > max)
                    .map(|_| RuleFinding::new(level, format!("Must be less than or equal to {max}")))
                    .into_iter()
                    .collect()),
                Self::Pattern(pattern) => Ok(value
                    .as_str()
                    .filter(|s| !pattern.is_match(s))
                    .map(|_| {
                        RuleFinding::new(
                            level,
                            format!("Does not match the pattern {}", pattern.as_str()),
                        )
                    })
                    .into_iter()
                    .collect()),
                Self::Keys(keys) => validate_keys(keys, value).await,
                Self::Items(rule) => validate_items(rule, value).await,
                Self::Either(alternatives) => validate_either(alternatives, value, ctx, level).await,
                Self::Required | Self::Custom(_) => Ok(Vec::new()),
            }
        }
        .boxed()
    }
}

/// Missing, `null`, empty strings and empty arrays count as absent.
pub(crate) fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn finding_if(failed: bool, level: Level, message: impl Into<String>) -> Vec<RuleFinding> {
    if failed {
        vec![RuleFinding::new(level, message)]
    } else {
        Vec::new()
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn too_short(value: &Value, min: usize) -> String {
    if value.is_array() {
        format!("Must have at least {min} items")
    } else {
        format!("Must be at least {min} characters long")
    }
}

fn too_long(value: &Value, max: usize) -> String {
    if value.is_array() {
        format!("Must have at most {max} items")
    } else {
        format!("Must be at most {max} characters long")
    }
}

fn list_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flatten joined results in order. The first error in declaration order wins.
pub(crate) fn collect_in_order(results: Vec<Findings>) -> Findings {
    let mut findings = Vec::new();
    for result in results {
        findings.extend(result?);
    }
    Ok(findings)
}

async fn run_custom(
    check: &CustomCheck,
    value: &Value,
    ctx: &ValidationContext,
    level: Level,
) -> Findings {
    let verdict = check
        .run(value, ctx)
        .await
        .map_err(|source| RuleError::Predicate {
            rule: check.label().to_string(),
            source,
        })?;

    Ok(match verdict {
        Verdict::Valid => Vec::new(),
        Verdict::Invalid(message) => vec![RuleFinding::new(level, message)],
        Verdict::InvalidAt(path, message) => vec![RuleFinding::at(level, path, message)],
    })
}

async fn validate_keys(keys: &[(String, Rule)], value: &Value) -> Findings {
    let Some(object) = value.as_object() else {
        return Ok(Vec::new());
    };
    let ctx = ValidationContext::with_parent(Arc::new(value.clone()));

    let checks = keys.iter().map(|(key, rule)| {
        let ctx = &ctx;
        async move {
            let field = object.get(key).unwrap_or(&Value::Null);
            let findings = rule.validate(field, ctx).await?;
            let nested: Vec<RuleFinding> = findings
                .into_iter()
                .map(|f| f.nested_under(PathSegment::field(key.as_str())))
                .collect();
            Ok::<_, RuleError>(nested)
        }
    });

    collect_in_order(join_all(checks).await)
}

async fn validate_items(rule: &Rule, value: &Value) -> Findings {
    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };
    let ctx = ValidationContext::with_parent(Arc::new(value.clone()));

    let checks = items.iter().enumerate().map(|(index, item)| {
        let ctx = &ctx;
        async move {
            let findings = rule.validate(item, ctx).await?;
            let segment = PathSegment::for_item(item, index);
            let nested: Vec<RuleFinding> = findings
                .into_iter()
                .map(|f| f.nested_under(segment.clone()))
                .collect();
            Ok::<_, RuleError>(nested)
        }
    });

    collect_in_order(join_all(checks).await)
}

/// Passes when some alternative raises no error. A clean alternative wins;
/// otherwise the first one with only warnings or info hands those back.
async fn validate_either(
    alternatives: &[Rule],
    value: &Value,
    ctx: &ValidationContext,
    level: Level,
) -> Findings {
    if alternatives.is_empty() {
        return Ok(Vec::new());
    }

    let results = join_all(alternatives.iter().map(|rule| rule.validate(value, ctx))).await;
    let outcomes = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    if outcomes.iter().any(Vec::is_empty) {
        return Ok(Vec::new());
    }
    let is_error = |finding: &RuleFinding| finding.level == Level::Error;
    if let Some(advisory) = outcomes
        .iter()
        .find(|findings| !findings.iter().any(is_error))
    {
        return Ok(advisory.clone());
    }

    let reasons: Vec<&str> = outcomes
        .iter()
        .filter_map(|findings| findings.iter().find(|f| is_error(f)))
        .map(|finding| finding.message.as_str())
        .collect();
    Ok(vec![RuleFinding::new(
        level,
        format!(
            "Value did not match any of the allowed alternatives ({})",
            reasons.join("; ")
        ),
    )])
}
