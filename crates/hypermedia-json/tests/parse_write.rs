use hypermedia_json::{parse, parse_bytes, to_string, JsonError, JsonValue};
use proptest::prelude::*;

#[test]
fn parses_document_shape() {
    let text = r#"
        {
          "data": {"type": "posts", "id": "2", "attributes": {"title": "T", "score": 1.5}},
          "included": []
        }
    "#;
    let value = parse(text).unwrap();
    let data = value.get("data").unwrap();
    assert_eq!(data.get("type").and_then(JsonValue::as_str), Some("posts"));
    assert_eq!(
        data.get("attributes").and_then(|a| a.get("score")),
        Some(&JsonValue::Decimal(1.5))
    );
    assert_eq!(value.get("included").and_then(JsonValue::as_array), Some(&[][..]));
}

#[test]
fn writer_preserves_key_order() {
    let text = r#"{"z":1,"a":2,"m":[true,false,null]}"#;
    assert_eq!(to_string(&parse(text).unwrap()), text);
}

#[test]
fn rejects_invalid_utf8() {
    assert_eq!(parse_bytes(b"\"\xff\""), Err(JsonError::InvalidUtf8));
}

#[test]
fn matches_serde_json_on_nested_values() {
    let text = r#"{"a":{"b":[1,2.5,"xA"]},"c":-0.125}"#;
    let ours: serde_json::Value = parse(text).unwrap().into();
    let theirs: serde_json::Value = serde_json::from_str(text).unwrap();
    assert_eq!(ours, theirs);
}

proptest! {
    #[test]
    fn strings_survive_write_then_parse(s in any::<String>()) {
        let value = JsonValue::Str(s);
        prop_assert_eq!(parse(&to_string(&value)).unwrap(), value);
    }

    #[test]
    fn finite_decimals_survive_write_then_parse(f in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let value = JsonValue::Decimal(f);
        prop_assert_eq!(parse(&to_string(&value)).unwrap(), value);
    }
}
