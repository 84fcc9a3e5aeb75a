//! Tests for field extraction

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

const EMPTY: &[&str] = &[];

fn sample() -> JsonValue {
    json!({
        "standings": [
            {"teamAbbrev": "BOS", "points": 20},
            {"teamAbbrev": "NYR", "points": 18}
        ],
        "meta": {"season": {"id": 20242025}},
        "count": 2,
        "missing": null
    })
}

// ============================================================================
// extract_field
// ============================================================================

#[test]
fn test_empty_path_returns_whole_body() {
    let data = sample();
    assert_eq!(extract_field(&data, EMPTY), Some(&data));
}

#[test_case(&["meta", "season", "id"], Some(json!(20242025)) ; "nested leaf")]
#[test_case(&["count"], Some(json!(2)) ; "top level scalar")]
#[test_case(&["meta", "nope"], None ; "missing key")]
#[test_case(&["count", "x"], None ; "scalar intermediate")]
#[test_case(&["standings", "0"], None ; "array intermediate")]
#[test_case(&["missing"], None ; "null leaf")]
#[test_case(&["missing", "deeper"], None ; "null intermediate")]
fn test_extract_field(path: &[&str], expected: Option<JsonValue>) {
    let data = sample();
    assert_eq!(extract_field(&data, path).cloned(), expected);
}

#[test]
fn test_extract_field_on_non_object_body() {
    assert_eq!(extract_field(&json!([1, 2]), &["a"]), None);
    assert_eq!(extract_field(&json!("text"), &["a"]), None);
    assert_eq!(extract_field(&json!([1, 2]), EMPTY), Some(&json!([1, 2])));
}

#[test]
fn test_extract_field_composes_with_empty_path() {
    let data = sample();
    for path in [
        vec!["standings"],
        vec!["meta", "season"],
        vec!["meta", "nope"],
        vec!["count", "x"],
    ] {
        let direct = extract_field(&data, path.as_slice());
        let composed = direct.and_then(|inner| extract_field(inner, EMPTY));
        assert_eq!(composed, direct, "path {path:?}");
    }
}

#[test]
fn test_extract_field_is_idempotent() {
    let data = sample();
    let path = ["meta", "season", "id"];
    let first = extract_field(&data, &path).cloned();
    let second = extract_field(&data, &path).cloned();
    assert_eq!(first, second);
}

// ============================================================================
// extract_records
// ============================================================================

#[test]
fn test_records_from_array() {
    let records = extract_records(&sample(), &["standings"]);
    assert_eq!(
        records,
        vec![
            json!({"teamAbbrev": "BOS", "points": 20}),
            json!({"teamAbbrev": "NYR", "points": 18}),
        ]
    );
}

#[test]
fn test_records_from_single_object_are_wrapped() {
    let records = extract_records(&sample(), &["meta", "season"]);
    assert_eq!(records, vec![json!({"id": 20242025})]);
}

#[test]
fn test_records_from_scalar_are_wrapped() {
    let records = extract_records(&sample(), &["count"]);
    assert_eq!(records, vec![json!(2)]);
}

#[test]
fn test_records_missing_path_is_empty() {
    assert!(extract_records(&sample(), &["nope"]).is_empty());
}

#[test]
fn test_records_empty_path_object_body() {
    let body = json!({"id": 2024020001, "homeTeam": {"abbrev": "BOS"}});
    assert_eq!(extract_records(&body, EMPTY), vec![body.clone()]);
}

#[test]
fn test_records_empty_path_non_object_body() {
    assert!(extract_records(&json!([{"id": 1}]), EMPTY).is_empty());
    assert!(extract_records(&json!(42), EMPTY).is_empty());
}

// ============================================================================
// into_records / has_data
// ============================================================================

#[test]
fn test_into_records_keeps_objects_only() {
    let records = into_records(
        "test",
        vec![json!({"a": 1}), json!(3), json!("x"), json!({"b": 2})],
    );
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["a"], 1);
    assert_eq!(records[1]["b"], 2);
}

#[test]
fn test_into_records_preserves_field_order() {
    let records = into_records("test", vec![json!({"z": 1, "a": 2, "m": 3})]);
    let keys: Vec<&String> = records[0].keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test_case(json!(null), false ; "null")]
#[test_case(json!({}), false ; "empty object")]
#[test_case(json!([]), false ; "empty array")]
#[test_case(json!({"a": 1}), true ; "object")]
#[test_case(json!([1]), true ; "array")]
#[test_case(json!(0), true ; "number")]
fn test_has_data(body: JsonValue, expected: bool) {
    assert_eq!(has_data(&body), expected);
}
