use super::*;
use serde_json::json;

#[test]
fn timestamp_attributes_parse_rfc3339() {
    let value = Value::from_json_as(
        AttributeKind::Timestamp,
        &json!("2020-03-02T15:16:15.790000+00:00"),
    );

    assert!(matches!(value, Value::Timestamp(_)));
    assert_eq!(
        value.compare(&Value::from("2020-03-02T15:16:15.79Z")),
        Some(Ordering::Equal)
    );
}

#[test]
fn unparseable_timestamp_is_kept_as_text() {
    let value = Value::from_json_as(AttributeKind::Timestamp, &json!("yesterday"));
    assert_eq!(value, Value::from("yesterday"));
}

#[test]
fn numbers_widen_across_int_and_float() {
    assert_eq!(
        Value::Int(237).compare(&Value::Float(237.0)),
        Some(Ordering::Equal)
    );
    assert_eq!(
        Value::Float(1.5).compare(&Value::Int(2)),
        Some(Ordering::Less)
    );
}

#[test]
fn cross_family_values_are_unordered() {
    assert_eq!(Value::from("1").compare(&Value::Int(1)), None);
    assert_eq!(Value::Bool(true).compare(&Value::Null), None);
}

#[test]
fn dotted_path_walks_nested_maps() {
    let misc = Value::from_json(&json!({"job": {"id": 678_223}}));

    assert_eq!(misc.get_path(["job", "id"]), Some(&Value::Int(678_223)));
    assert_eq!(misc.get_path(["job", "missing"]), None);
    assert_eq!(misc.get_path(["job", "id", "deeper"]), None);
}

#[test]
fn contains_handles_text_and_lists() {
    let list = Value::from_json(&json!(["a@x.org", "b@x.org"]));

    assert_eq!(list.contains(&Value::from("b@x.org")), Some(true));
    assert_eq!(
        Value::from("IOMMU boot test").contains(&Value::from("boot")),
        Some(true)
    );
    assert_eq!(Value::Int(3).contains(&Value::Int(3)), None);
}

#[test]
fn display_renders_human_text() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::from_json(&json!([1, "two"])).to_string(), "1, two");
    assert_eq!(Value::from_json(&json!({"lab": "x"})).to_string(), "{lab: x}");
}
