//! Fixtures shared by the validator integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use quire_rules::Rule;
use quire_schema::{Field, InferredSchema, Schema, SchemaType};
use quire_validate::{Diagnostics, DocumentValidator, ValidateError};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// What the validator reported out of band.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    pub missing_types: Mutex<Vec<Option<String>>>,
    pub failures: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn missing_types(&self) -> Vec<Option<String>> {
        self.missing_types.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn schema_type_not_found(&self, type_name: Option<&str>) {
        self.missing_types
            .lock()
            .unwrap()
            .push(type_name.map(str::to_string));
    }

    fn unexpected_failure(&self, error: &ValidateError) {
        self.failures.lock().unwrap().push(format!("{error:?}"));
    }
}

/// A small blog schema: people, slugs, and posts with typed sections.
pub fn blog_types() -> Vec<SchemaType> {
    vec![
        SchemaType::object([
            Field::new("name", SchemaType::string()).validation(Rule::new().required()),
        ])
        .named("person"),
        SchemaType::object([Field::new("current", SchemaType::string()).validation(
            Rule::new()
                .required()
                .pattern("^[a-z0-9-]+$")
                .expect("slug pattern compiles"),
        )])
        .named("slug"),
        SchemaType::object([
            Field::new("title", SchemaType::string())
                .validation(Rule::new().required().max_length(20)),
            Field::new("subtitle", SchemaType::string())
                .validation(Rule::new().max_length(30).warning()),
            Field::new("slug", SchemaType::reference("slug")),
            Field::new("author", SchemaType::reference("person")),
            Field::new(
                "sections",
                SchemaType::array([
                    SchemaType::object([
                        Field::new("text", SchemaType::string()).validation(Rule::new().required()),
                    ])
                    .named("textBlock"),
                    SchemaType::object([
                        Field::new("alt", SchemaType::string()).validation(Rule::new().required()),
                    ])
                    .named("imageBlock"),
                ]),
            ),
            Field::new("tags", SchemaType::array([SchemaType::string()])),
            Field::new(
                "points",
                SchemaType::array([SchemaType::object([
                    Field::new("x", SchemaType::number()).validation(Rule::new().required()),
                ])]),
            ),
        ])
        .named("post"),
    ]
}

pub fn infer(types: Vec<SchemaType>) -> Arc<InferredSchema> {
    Arc::new(
        Schema::from_types(types)
            .expect("schema registers")
            .infer()
            .expect("schema infers"),
    )
}

pub fn blog_validator() -> (DocumentValidator, Arc<RecordingDiagnostics>) {
    init_tracing();
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let validator = DocumentValidator::new(infer(blog_types()))
        .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>);
    (validator, diagnostics)
}
