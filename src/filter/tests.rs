//! Tests for the filter engine

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn record(value: serde_json::Value) -> Record {
    value.as_object().expect("test record is an object").clone()
}

fn scores() -> Vec<Record> {
    vec![
        record(json!({"id": 1, "score": 1.0, "name": "ab"})),
        record(json!({"id": 2, "score": 4.0, "name": "abc"})),
        record(json!({"id": 3, "score": 6.5, "name": "ac"})),
        record(json!({"id": 4, "score": 9.0, "name": "abcd"})),
    ]
}

fn ids(records: &[Record]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r.get("id").and_then(JsonValue::as_i64).unwrap())
        .collect()
}

fn spec(field: &str, values: &[&str]) -> FilterSpec {
    let mut filters = FilterSpec::new();
    filters.insert(field.to_string(), values.iter().map(ToString::to_string).collect());
    filters
}

// ============================================================================
// No-op and ordering
// ============================================================================

#[test]
fn test_empty_spec_is_noop() {
    let records = scores();
    let filtered = apply_filters(records.clone(), &FilterSpec::new());
    assert_eq!(filtered, records);
}

#[test]
fn test_filtering_preserves_order() {
    let filtered = apply_filters(scores(), &spec("score", &[">0"]));
    assert_eq!(ids(&filtered), vec![1, 2, 3, 4]);
}

// ============================================================================
// Numeric predicates
// ============================================================================

#[test]
fn test_numeric_greater_than() {
    let filtered = apply_filters(scores(), &spec("score", &[">5"]));
    assert_eq!(ids(&filtered), vec![3, 4]);
}

#[test]
fn test_numeric_less_than() {
    let filtered = apply_filters(scores(), &spec("score", &["<2"]));
    assert_eq!(ids(&filtered), vec![1]);
}

#[test]
fn test_numeric_implicit_equality() {
    let filtered = apply_filters(scores(), &spec("score", &["6.5"]));
    assert_eq!(ids(&filtered), vec![3]);
}

#[test]
fn test_same_field_predicates_are_a_union() {
    // ">5" OR "<2", not the intersection
    let filtered = apply_filters(scores(), &spec("score", &[">5", "<2"]));
    assert_eq!(ids(&filtered), vec![1, 3, 4]);
}

#[test_case("!=4"; "ascii not equal")]
#[test_case("≠4"; "unicode not equal")]
#[test_case("<>4"; "angle bracket not equal")]
fn test_negated_numeric_variants_agree(predicate: &str) {
    let filtered = apply_filters(scores(), &spec("score", &[predicate]));
    assert_eq!(ids(&filtered), vec![1, 3, 4]);
}

#[test]
fn test_numeric_inclusive_bounds() {
    let filtered = apply_filters(scores(), &spec("score", &[">=6.5"]));
    assert_eq!(ids(&filtered), vec![3, 4]);

    let filtered = apply_filters(scores(), &spec("score", &["≤4"]));
    assert_eq!(ids(&filtered), vec![1, 2]);
}

#[test]
fn test_numeric_against_numeric_string_value() {
    let records = vec![
        record(json!({"id": 1, "grade": "88"})),
        record(json!({"id": 2, "grade": "42"})),
    ];
    let filtered = apply_filters(records, &spec("grade", &[">50"]));
    assert_eq!(ids(&filtered), vec![1]);
}

// ============================================================================
// String predicates
// ============================================================================

#[test]
fn test_wildcard_is_anchored_both_ends() {
    // "a*c" matches "abc" and "ac" but not "abcd"
    let filtered = apply_filters(scores(), &spec("name", &["a*c"]));
    assert_eq!(ids(&filtered), vec![2, 3]);
}

#[test]
fn test_wildcard_without_star_is_exact() {
    let filtered = apply_filters(scores(), &spec("name", &["abc"]));
    assert_eq!(ids(&filtered), vec![2]);
}

#[test]
fn test_wildcard_escapes_regex_metacharacters() {
    let records = vec![
        record(json!({"id": 1, "code": "a.c"})),
        record(json!({"id": 2, "code": "abc"})),
    ];
    let filtered = apply_filters(records, &spec("code", &["a.c"]));
    assert_eq!(ids(&filtered), vec![1]);
}

#[test]
fn test_string_negation() {
    let filtered = apply_filters(scores(), &spec("name", &["!=abc"]));
    assert_eq!(ids(&filtered), vec![1, 3, 4]);

    let filtered = apply_filters(scores(), &spec("name", &["≠abc"]));
    assert_eq!(ids(&filtered), vec![1, 3, 4]);
}

// ============================================================================
// Cross-field combination and missing fields
// ============================================================================

#[test]
fn test_fields_combine_with_and() {
    let mut filters = spec("score", &[">2"]);
    filters.insert("name".to_string(), vec!["a*c".to_string()]);

    let filtered = apply_filters(scores(), &filters);
    assert_eq!(ids(&filtered), vec![2, 3]);
}

#[test]
fn test_missing_field_excludes_record() {
    let records = vec![
        record(json!({"id": 1, "score": 8})),
        record(json!({"id": 2})),
        record(json!({"id": 3, "score": 7})),
    ];
    let filtered = apply_filters(records, &spec("score", &[">5"]));
    assert_eq!(ids(&filtered), vec![1, 3]);
}

#[test]
fn test_missing_field_excludes_even_when_other_fields_match() {
    let mut filters = spec("id", &[">0"]);
    filters.insert("score".to_string(), vec![">0".to_string()]);

    let records = vec![
        record(json!({"id": 1, "score": 3})),
        record(json!({"id": 2})),
    ];
    let filtered = apply_filters(records, &filters);
    assert_eq!(ids(&filtered), vec![1]);
}

// ============================================================================
// Predicate parsing
// ============================================================================

#[test]
fn test_split_operator_longest_prefix_wins() {
    assert_eq!(split_operator(">=5"), (Some(NumericOp::Ge), "5"));
    assert_eq!(split_operator(">5"), (Some(NumericOp::Gt), "5"));
    assert_eq!(split_operator("<>5"), (Some(NumericOp::Ne), "5"));
    assert_eq!(split_operator("≠abc"), (Some(NumericOp::Ne), "abc"));
    assert_eq!(split_operator("plain"), (None, "plain"));
}

#[test]
fn test_predicate_classification() {
    assert!(matches!(
        Predicate::parse(">5"),
        Predicate::Numeric {
            op: NumericOp::Gt,
            ..
        }
    ));
    assert!(matches!(Predicate::parse("5"), Predicate::Numeric { .. }));
    assert!(matches!(
        Predicate::parse("!=draft"),
        Predicate::NotEqualText { .. }
    ));
    assert!(matches!(Predicate::parse("a*"), Predicate::Wildcard { .. }));
}

#[test]
fn test_non_string_values_fail_wildcards() {
    let records = vec![record(json!({"id": 1, "name": 42}))];
    let filtered = apply_filters(records, &spec("name", &["4*"]));
    assert!(filtered.is_empty());
}
