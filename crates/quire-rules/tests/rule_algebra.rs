//! Behaviour of composed rules: nesting, unions, merging and custom predicates.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use quire_core::{Level, Path, PathSegment};
use quire_rules::{CustomCheck, Rule, RuleError, RuleFinding, ValidationContext, Verdict};
use rstest::rstest;
use serde_json::{Value, json};

async fn run(rule: &Rule, value: &Value) -> Vec<RuleFinding> {
    rule.validate(value, &ValidationContext::root())
        .await
        .expect("rule should not fail")
}

fn path(segments: Vec<PathSegment>) -> Option<Path> {
    Some(Path::from(segments))
}

#[rstest]
#[case(json!("ab"), 1)]
#[case(json!("abc"), 0)]
#[case(json!("abcdef"), 1)]
#[case(json!(["a", "b"]), 1)]
#[case(json!(12), 0)]
#[tokio::test]
async fn length_bounds(#[case] value: Value, #[case] expected: usize) {
    let rule = Rule::new().min_length(3).max_length(5);
    assert_eq!(run(&rule, &value).await.len(), expected);
}

#[rstest]
#[case(json!(0), 1)]
#[case(json!(1), 0)]
#[case(json!(10.5), 1)]
#[tokio::test]
async fn numeric_bounds(#[case] value: Value, #[case] expected: usize) {
    let rule = Rule::number().min(1.0).max(10.0);
    assert_eq!(run(&rule, &value).await.len(), expected);
}

#[tokio::test]
async fn pattern_only_applies_to_strings() {
    let rule = Rule::new().pattern("^[a-z0-9-]+$").unwrap();
    assert!(run(&rule, &json!("my-slug")).await.is_empty());
    assert_eq!(run(&rule, &json!("My Slug")).await.len(), 1);
    assert!(run(&rule, &json!(5)).await.is_empty());
}

#[tokio::test]
async fn valid_lists_allowed_values() {
    let rule = Rule::string().valid(["draft", "published"]);
    let findings = run(&rule, &json!("archived")).await;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].message, "Value must be one of: draft, published");
}

#[tokio::test]
async fn keys_report_under_the_key() {
    let rule = Rule::object().keys([
        ("_type", Rule::string().valid(["author"])),
        ("name", Rule::string().required()),
    ]);

    let findings = run(&rule, &json!({"_type": "book"})).await;
    assert_eq!(
        findings.iter().map(|f| f.path.clone()).collect::<Vec<_>>(),
        vec![
            path(vec![PathSegment::field("_type")]),
            path(vec![PathSegment::field("name")]),
        ]
    );
}

#[tokio::test]
async fn items_report_under_key_or_index() {
    let rule = Rule::array().items(Rule::object().keys([("title", Rule::string().required())]));
    let value = json!([
        {"_key": "a", "title": "ok"},
        {"_key": "b"},
        {"title": ""}
    ]);

    let findings = run(&rule, &value).await;
    assert_eq!(
        findings.into_iter().map(|f| f.path).collect::<Vec<_>>(),
        vec![
            path(vec![PathSegment::key("b"), PathSegment::field("title")]),
            path(vec![PathSegment::Index(2), PathSegment::field("title")]),
        ]
    );
}

#[tokio::test]
async fn either_passes_when_any_alternative_passes() {
    let rule = Rule::either([
        Rule::object().keys([("_type", Rule::string().valid(["a"]))]),
        Rule::object().keys([("_type", Rule::string().valid(["b"]))]),
    ]);

    assert!(run(&rule, &json!({"_type": "b"})).await.is_empty());

    let findings = run(&rule, &json!({"_type": "c"})).await;
    assert_eq!(findings.len(), 1);
    assert!(findings[0].message.starts_with("Value did not match any of the allowed alternatives"));
    assert_eq!(findings[0].path, None);
}

#[tokio::test]
async fn either_accepts_an_alternative_with_only_warnings() {
    let rule = Rule::either([Rule::string().max_length(3).warning(), Rule::number()]);

    assert!(run(&rule, &json!(5)).await.is_empty());

    let findings = run(&rule, &json!("abcdef")).await;
    assert_eq!(
        findings,
        vec![RuleFinding::new(Level::Warning, "Must be at most 3 characters long")]
    );
}

#[tokio::test]
async fn merge_is_last_write_wins_on_overlap() {
    let base = Rule::string().max_length(10).required();
    let merged = base.merge(&Rule::new().max_length(3));

    assert_eq!(merged.check_names(), vec!["max_length", "required"]);
    let findings = run(&merged, &json!("abcd")).await;
    assert_eq!(findings[0].message, "Must be at most 3 characters long");

    let reversed = Rule::new().max_length(3).merge(&base);
    assert!(run(&reversed, &json!("abcd")).await.is_empty());
}

#[tokio::test]
async fn merge_keeps_non_overlapping_checks_in_order() {
    let a = Rule::string().min_length(2);
    let b = Rule::new().pattern("^x").unwrap();
    let c = Rule::new().required();

    let left = a.merge(&b).merge(&c);
    let right = a.merge(&b.merge(&c));
    assert_eq!(left.check_names(), right.check_names());
    assert_eq!(left.check_names(), vec!["min_length", "pattern", "required"]);
}

#[tokio::test]
async fn merging_a_rule_with_itself_does_not_duplicate_predicates() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let rule = Rule::string().custom(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Verdict::invalid("nope"))
    });

    let merged = rule.merge(&rule);
    assert_eq!(run(&merged, &json!("x")).await.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn named_checks_replace_each_other() {
    let strict = CustomCheck::sync(|_, _| Ok(Verdict::invalid("strict"))).named("policy");
    let lenient = CustomCheck::sync(|_, _| Ok(Verdict::Valid)).named("policy");

    let rule = Rule::string().check(strict).merge(&Rule::new().check(lenient));
    assert_eq!(rule.check_names(), vec!["custom"]);
    assert!(run(&rule, &json!("x")).await.is_empty());
}

#[tokio::test]
async fn custom_predicates_see_the_parent() {
    let rule = Rule::object().keys([(
        "confirm",
        Rule::string().custom(|value, ctx| {
            Ok(Verdict::check(
                ctx.sibling("password") == Some(value),
                "Passwords do not match",
            ))
        }),
    )]);

    assert!(run(&rule, &json!({"password": "x", "confirm": "x"})).await.is_empty());
    assert_eq!(run(&rule, &json!({"password": "x", "confirm": "y"})).await.len(), 1);
}

#[tokio::test]
async fn async_results_keep_declaration_order() {
    let slow = |delay_ms: u64, message: &'static str| {
        CustomCheck::from_async(move |_, _| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok::<_, anyhow::Error>(Verdict::invalid(message))
        })
        .named(message)
    };

    let rule = Rule::new()
        .check(slow(30, "first"))
        .check(slow(1, "second"))
        .check(slow(15, "third"));

    let messages: Vec<String> = run(&rule, &json!("v")).await.into_iter().map(|f| f.message).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn custom_can_report_into_a_sub_path() {
    let rule = Rule::object().custom(|_, _| {
        Ok(Verdict::InvalidAt(
            Path::root().child("current"),
            "Slug is already in use".into(),
        ))
    });
    let findings = run(&rule, &json!({"current": "taken"})).await;
    assert_eq!(findings[0].path, path(vec![PathSegment::field("current")]));
}

#[tokio::test]
async fn failing_predicate_rejects() {
    let rule = Rule::string().check(
        CustomCheck::from_async(|_, _| async { Err::<Verdict, _>(anyhow::anyhow!("lookup unavailable")) })
            .named("unique"),
    );

    let err = rule
        .validate(&json!("x"), &ValidationContext::root())
        .await
        .unwrap_err();
    match err {
        RuleError::Predicate { rule, source } => {
            assert_eq!(rule, "unique");
            assert_eq!(source.to_string(), "lookup unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn level_applies_to_own_findings_only() {
    let rule = Rule::object()
        .keys([("title", Rule::string().required())])
        .custom(|_, _| Ok(Verdict::invalid("Consider adding a subtitle")))
        .warning();

    let findings = run(&rule, &json!({})).await;
    assert_eq!(
        findings
            .iter()
            .map(|f| (f.level, f.message.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (Level::Error, "Required"),
            (Level::Warning, "Consider adding a subtitle"),
        ]
    );
}
