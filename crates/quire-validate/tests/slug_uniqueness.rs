//! Asynchronous uniqueness checks against a backing store.

mod common;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::{infer, init_tracing};
use pretty_assertions::assert_eq;
use quire_core::{Marker, Path};
use quire_rules::{CustomCheck, Rule, Verdict};
use quire_schema::{Field, RuleSpec, SchemaType};
use quire_validate::{DocumentValidator, MarkerQuery};
use serde_json::json;

/// Slugs already used by other documents.
#[derive(Debug, Default)]
struct SlugStore {
    taken: Mutex<HashSet<String>>,
}

impl SlugStore {
    fn with(slugs: &[&str]) -> Arc<Self> {
        let store = Self::default();
        store
            .taken
            .lock()
            .unwrap()
            .extend(slugs.iter().map(|s| (*s).to_string()));
        Arc::new(store)
    }

    async fn is_taken(&self, slug: &str) -> bool {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.taken.lock().unwrap().contains(slug)
    }
}

/// Rejects slugs that are stored already, or that `reserved` claims.
fn unique_slug(store: Arc<SlugStore>, reserved: fn(&str) -> bool) -> CustomCheck {
    CustomCheck::from_async(move |value, _| {
        let store = Arc::clone(&store);
        async move {
            let Some(current) = value.get("current").and_then(|c| c.as_str()) else {
                return Ok(Verdict::Valid);
            };
            let taken = reserved(current) || store.is_taken(current).await;
            Ok::<_, anyhow::Error>(if taken {
                Verdict::InvalidAt(Path::root().child("current"), "Slug is already in use".into())
            } else {
                Verdict::Valid
            })
        }
    })
    .named("unique")
}

fn validator(store: Arc<SlugStore>) -> DocumentValidator {
    init_tracing();
    let slug_field = |name: &str, reserved: fn(&str) -> bool| {
        let store = Arc::clone(&store);
        Field::new(name, SchemaType::reference("slug")).validation(RuleSpec::derived(move |base| {
            base.check(unique_slug(Arc::clone(&store), reserved))
        }))
    };

    let schema = infer(vec![
        SchemaType::object([Field::new("current", SchemaType::string()).validation(
            Rule::new()
                .required()
                .max_length(96)
                .pattern("^[a-z0-9-]+$")
                .expect("slug pattern compiles"),
        )])
        .named("slug"),
        SchemaType::object([
            Field::new("title", SchemaType::string()),
            slug_field("slug", |_| false),
            slug_field("slugWithCustomUniqueCheck", |value| value.to_lowercase().starts_with("hei")),
            Field::new(
                "nested",
                SchemaType::object([slug_field("slugWithSlugify", |_| false)]),
            ),
        ])
        .named("slugsTest"),
    ]);
    DocumentValidator::new(schema)
}

fn summary(markers: &[Marker]) -> Vec<String> {
    markers
        .iter()
        .map(|m| format!("{}: {}", m.path, m.message()))
        .collect()
}

#[tokio::test]
async fn fresh_slugs_pass() {
    let validator = validator(SlugStore::with(&["existing"]));

    let markers = validator
        .validate_document(&json!({
            "_type": "slugsTest",
            "title": "Hello",
            "slug": {"current": "hello"},
            "slugWithCustomUniqueCheck": {"current": "hello-world"},
            "nested": {"slugWithSlugify": {"current": "slugstest-hello"}}
        }))
        .await;

    assert!(markers.is_empty(), "{:?}", summary(&markers));
}

#[tokio::test]
async fn taken_slugs_report_at_current() {
    let validator = validator(SlugStore::with(&["existing"]));

    let markers = validator
        .validate_document(&json!({
            "_type": "slugsTest",
            "slug": {"current": "existing"},
            "slugWithCustomUniqueCheck": {"current": "heidi"},
            "nested": {"slugWithSlugify": {"current": "Not Valid"}}
        }))
        .await;

    assert_eq!(
        summary(&markers),
        vec![
            "slug.current: Slug is already in use",
            "slugWithCustomUniqueCheck.current: Slug is already in use",
            "nested.slugWithSlugify.current: Does not match the pattern ^[a-z0-9-]+$",
        ]
    );
    assert_eq!(
        markers.first_error_at(&Path::root().child("slug").child("current")),
        Some("Slug is already in use")
    );
}
