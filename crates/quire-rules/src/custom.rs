//! Author-supplied predicates.
//!
//! A predicate is either synchronous (borrows the value) or asynchronous
//! (owns a copy of the value and the context, so it can await external
//! lookups such as a uniqueness check against a backing store).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use quire_core::Path;
use serde_json::Value;

use crate::finding::ValidationContext;

/// Outcome of a custom predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
    /// Invalid, reported into a sub-structure of the value.
    InvalidAt(Path, String),
}

impl Verdict {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// `Valid` when `ok`, else `Invalid(message)`.
    pub fn check(ok: bool, message: impl Into<String>) -> Self {
        if ok { Self::Valid } else { Self::invalid(message) }
    }
}

type SyncPredicate = dyn Fn(&Value, &ValidationContext) -> anyhow::Result<Verdict> + Send + Sync;
type AsyncPredicate =
    dyn Fn(Value, ValidationContext) -> BoxFuture<'static, anyhow::Result<Verdict>> + Send + Sync;

#[derive(Clone)]
enum Predicate {
    Sync(Arc<SyncPredicate>),
    Async(Arc<AsyncPredicate>),
}

/// A named or anonymous custom check attached to a rule.
#[derive(Clone)]
pub struct CustomCheck {
    name: Option<Arc<str>>,
    predicate: Predicate,
}

impl CustomCheck {
    pub fn sync<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &ValidationContext) -> anyhow::Result<Verdict> + Send + Sync + 'static,
    {
        Self {
            name: None,
            predicate: Predicate::Sync(Arc::new(predicate)),
        }
    }

    pub fn from_async<F, Fut>(predicate: F) -> Self
    where
        F: Fn(Value, ValidationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Verdict>> + Send + 'static,
    {
        Self {
            name: None,
            predicate: Predicate::Async(Arc::new(move |value, ctx| predicate(value, ctx).boxed())),
        }
    }

    /// Give the check a name. Named checks replace each other on merge.
    #[must_use]
    pub fn named(self, name: impl AsRef<str>) -> Self {
        Self {
            name: Some(Arc::from(name.as_ref())),
            ..self
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Label used in error reports.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name().unwrap_or("custom")
    }

    /// Whether `other` occupies the same merge slot as `self`.
    ///
    /// Named checks match by name; anonymous checks only match themselves.
    pub(crate) fn same_slot(&self, other: &Self) -> bool {
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a == b,
            (None, None) => match (&self.predicate, &other.predicate) {
                (Predicate::Sync(a), Predicate::Sync(b)) => Arc::ptr_eq(a, b),
                (Predicate::Async(a), Predicate::Async(b)) => Arc::ptr_eq(a, b),
                _ => false,
            },
            _ => false,
        }
    }

    pub(crate) async fn run(&self, value: &Value, ctx: &ValidationContext) -> anyhow::Result<Verdict> {
        match &self.predicate {
            Predicate::Sync(predicate) => predicate(value, ctx),
            Predicate::Async(predicate) => predicate(value.clone(), ctx.clone()).await,
        }
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.predicate {
            Predicate::Sync(_) => "sync",
            Predicate::Async(_) => "async",
        };
        f.debug_struct("CustomCheck")
            .field("name", &self.label())
            .field("mode", &mode)
            .finish()
    }
}
