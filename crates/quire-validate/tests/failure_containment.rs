//! Unexpected failures collapse into one root marker and never reach callers.

mod common;

use std::sync::Arc;

use common::{RecordingDiagnostics, infer, init_tracing};
use pretty_assertions::assert_eq;
use quire_config::{QuireConfig, ValidationConfig};
use quire_core::{Level, Marker, Path};
use quire_rules::{CustomCheck, Rule, RuleError, Verdict};
use quire_schema::{Field, InferredSchema, Schema, SchemaError, SchemaType};
use quire_validate::{Diagnostics, DocumentValidator, ValidateError};
use serde_json::json;

fn schema_with_broken_check() -> Arc<InferredSchema> {
    infer(vec![
        SchemaType::object([
            Field::new("title", SchemaType::string()).validation(Rule::new().required()),
            Field::new("slug", SchemaType::string()).validation(Rule::new().check(
                CustomCheck::from_async(|_, _| async {
                    Err::<Verdict, _>(anyhow::anyhow!("slug index unavailable"))
                })
                .named("unique"),
            )),
        ])
        .named("article"),
    ])
}

fn recording(schema: Arc<InferredSchema>) -> (DocumentValidator, Arc<RecordingDiagnostics>) {
    init_tracing();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let validator = DocumentValidator::new(schema)
        .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>);
    (validator, diagnostics)
}

#[tokio::test]
async fn failing_predicate_yields_one_root_marker() {
    let (validator, diagnostics) = recording(schema_with_broken_check());

    // The empty title would be a finding; it is discarded with the rest.
    let markers = validator
        .validate_document(&json!({"_type": "article", "title": "", "slug": "x"}))
        .await;

    assert_eq!(
        markers,
        vec![Marker::validation(
            Level::Error,
            Path::root(),
            "An unexpected error occurred while validating the document"
        )]
    );

    let failures = diagnostics.failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("slug index unavailable"), "{failures:?}");
}

#[tokio::test]
async fn try_validate_hands_back_the_failure() {
    let (validator, _) = recording(schema_with_broken_check());

    let err = validator
        .try_validate_document(&json!({"_type": "article", "slug": "x"}))
        .await
        .unwrap_err();

    match err {
        ValidateError::Rule(RuleError::Predicate { rule, .. }) => assert_eq!(rule, "unique"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn generic_message_is_configurable() {
    let (validator, _) = recording(schema_with_broken_check());
    let validator = validator.with_config(ValidationConfig {
        internal_error_message: "Validation is temporarily unavailable".into(),
        ..ValidationConfig::default()
    });

    let markers = validator
        .validate_document(&json!({"_type": "article", "slug": "x"}))
        .await;
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].message(), "Validation is temporarily unavailable");
}

#[tokio::test]
async fn walks_past_the_depth_limit_are_contained() {
    let mut nested = SchemaType::string();
    for _ in 0..4 {
        nested = SchemaType::object([
            Field::new("child", nested).validation(Rule::new().required()),
        ]);
    }
    let schema = infer(vec![nested.named("tree")]);

    let mut config = QuireConfig::default();
    config.validation.max_depth = 2;
    let (validator, diagnostics) = recording(Arc::clone(&schema));
    let shallow = DocumentValidator::from_config(schema, &config)
        .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>);

    let document = json!({
        "_type": "tree",
        "child": {"child": {"child": {"child": "leaf"}}}
    });

    assert!(validator.validate_document(&document).await.is_empty());

    let markers = shallow.validate_document(&document).await;
    assert_eq!(markers.len(), 1);
    assert!(markers[0].path.is_root());
    assert!(matches!(
        shallow.try_validate_document(&document).await,
        Err(ValidateError::DepthExceeded { max_depth: 2, .. })
    ));
    assert_eq!(diagnostics.failures().len(), 1);
}

#[test]
fn compile_applies_the_inference_limit() {
    let mut nested = SchemaType::string();
    for _ in 0..4 {
        nested = SchemaType::object([Field::new("child", nested)]);
    }
    let schema = Schema::from_types([nested.named("tree")]).unwrap();

    assert!(DocumentValidator::compile(&schema, &QuireConfig::default()).is_ok());

    let mut config = QuireConfig::default();
    config.inference.max_depth = 2;
    assert!(matches!(
        DocumentValidator::compile(&schema, &config),
        Err(SchemaError::DepthExceeded { max_depth: 2, .. })
    ));
}
