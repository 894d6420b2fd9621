//! Unit tests for pattern compilation and lookup.

use mocksql_types::{ColumnType, Field, QueryResult, SqlError, Value};
use rstest::rstest;

use super::*;

fn labelled(label: &str) -> QueryResult {
    QueryResult::new()
        .with_fields(vec![Field::new("label", ColumnType::VarChar)])
        .with_row(vec![Value::from(label)])
}

#[rstest]
#[case::exact("select 1", "select 1", true)]
#[case::case_insensitive("select 1", "SELECT 1", true)]
#[case::anchored_start("select 1", "xselect 1", false)]
#[case::anchored_end("select 1", "select 10", false)]
#[case::wildcard("select .* from t", "select a, b from t", true)]
#[case::newlines("select .* from t", "select a,\nb from t", true)]
#[case::alternation_is_grouped("select 1|select 2", "select 2", true)]
#[case::alternation_stays_anchored("select 1|select 2", "select 2 limit 1", false)]
fn anchored_matching(#[case] pattern: &str, #[case] query: &str, #[case] expected: bool) {
    let expr = compile_anchored(pattern).expect("compile pattern");
    assert_eq!(expr.is_match(query), expected, "{pattern} vs {query}");
}

#[test]
fn invalid_pattern_is_reported() {
    let error = compile_anchored("select (").expect_err("must fail");
    match error {
        SetupError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "select ("),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rows_without_fields_are_rejected() {
    let result = QueryResult::new().with_row(vec![Value::from(1_i64)]);
    let error = PatternEntry::result("select .*", result).expect_err("must fail");
    assert!(matches!(error, SetupError::MissingFields { .. }));
}

#[test]
fn field_only_results_are_accepted() {
    let result = QueryResult::new().with_fields(vec![Field::new("a", ColumnType::Int64)]);
    let entry = PatternEntry::result("select a from t", result).expect("valid pattern");
    assert_eq!(entry.source(), "select a from t");
}

#[test]
fn first_registered_match_wins() {
    let mut store = PatternStore::default();
    store.push_result(PatternEntry::result("select .*", labelled("broad")).expect("pattern"));
    store.push_result(PatternEntry::result("select 1", labelled("narrow")).expect("pattern"));

    let hit = store.first_result("select 1").expect("match");
    assert_eq!(hit.outcome(), &labelled("broad"));
    assert_eq!(hit.source(), "select .*");
    assert!(store.first_result("update t").is_none());
}

#[test]
fn error_lookup_uses_its_own_list() {
    let mut store = PatternStore::default();
    store.push_error(
        PatternEntry::error("drop .*", SqlError::new(1142, "denied")).expect("pattern"),
    );
    store.push_result(PatternEntry::result("select .*", labelled("ok")).expect("pattern"));

    assert_eq!(
        store.first_error("drop table t").map(|e| e.outcome().code()),
        Some(1142)
    );
    assert!(store.first_error("select 1").is_none());
    assert!(store.first_result("drop table t").is_none());
}

#[test]
fn clear_errors_keeps_result_patterns() {
    let mut store = PatternStore::default();
    store.push_error(PatternEntry::error(".*", SqlError::new(1105, "x")).expect("pattern"));
    store.push_result(PatternEntry::result(".*", labelled("ok")).expect("pattern"));

    store.clear_errors();
    assert!(store.first_error("select 1").is_none());
    assert!(store.first_result("select 1").is_some());

    store.clear();
    assert!(store.first_result("select 1").is_none());
}
