// SPDX-License-Identifier: Apache-2.0

use hostjson::{
    stringify, stringify_with, Array, Boxed, CodecLimits, Error, Function, Indent, JsString,
    NativeInvoker, Object, Primitive, Replacer, Value, NESTED_TOO_DEEP,
};

fn to_json(value: &Value) -> Option<String> {
    to_json_with(value, &Replacer::None, &Indent::none())
}

fn to_json_with(value: &Value, replacer: &Replacer, indent: &Indent) -> Option<String> {
    stringify(value, replacer, indent, &mut NativeInvoker::new())
        .unwrap()
        .map(|text| text.to_string())
}

#[test_log::test]
fn test_numbers() {
    let cases = [
        (0.0, "0"),
        (-0.0, "0"),
        (1.5, "1.5"),
        (-42.0, "-42"),
        (0.1, "0.1"),
        (1e21, "1e+21"),
        (123456789012345680000.0, "123456789012345680000"),
        (1e-7, "1e-7"),
        (0.000001, "0.000001"),
        (f64::NAN, "null"),
        (f64::INFINITY, "null"),
        (f64::NEG_INFINITY, "null"),
    ];
    for (number, expected) in cases {
        assert_eq!(to_json(&Value::from(number)).as_deref(), Some(expected), "{number}");
    }
}

#[test_log::test]
fn test_string_escapes() {
    let value = Value::from("q\"b\\n\nt\tc\u{1}\u{1f}é😀/");
    assert_eq!(
        to_json(&value).as_deref(),
        Some(r#""q\"b\\n\nt\tc\u0001\u001Fé😀/""#)
    );
}

#[test_log::test]
fn test_long_output_spans_chunks() {
    let long = "x".repeat(1000);
    let value = Value::from(vec![Value::from(long.as_str()); 3]);
    let text = to_json(&value).unwrap();
    assert_eq!(text.len(), 3 * 1002 + 4);
    assert!(text.starts_with("[\"xxx"));
    assert!(text.ends_with("xxx\"]"));
}

#[test_log::test]
fn test_to_json_inherited_from_prototype() {
    let proto = Object::new();
    proto.set(
        "toJSON",
        Value::from(Function::native("toJSON", |_, this, _| {
            let stamp = this
                .as_object()
                .and_then(|object| object.get_own("stamp"))
                .unwrap_or_default();
            Ok(Value::from(format!("T{}", stamp.as_number().unwrap_or(0.0))))
        })),
    );
    let date = Object::with_prototype(proto);
    date.set("stamp", Value::from(5));
    let value = Value::from(Object::from_pairs([("when", Value::from(date))]));
    assert_eq!(to_json(&value).as_deref(), Some(r#"{"when":"T5"}"#));
}

#[test_log::test]
fn test_to_json_returning_undefined_at_root() {
    let object = Object::new();
    object.set(
        "toJSON",
        Value::from(Function::native("toJSON", |_, _, _| Ok(Value::Undefined))),
    );
    assert_eq!(to_json(&Value::from(object)), None);
    assert_eq!(to_json(&Value::from(Function::host("f", 1))), None);
}

#[test_log::test]
fn test_boxed_primitives() {
    let value = Value::from(vec![
        Value::from(Boxed::new(Primitive::String(JsString::from("s")))),
        Value::from(Boxed::new(Primitive::Number(f64::NAN))),
        Value::from(Boxed::new(Primitive::Boolean(true))),
    ]);
    assert_eq!(to_json(&value).as_deref(), Some(r#"["s",null,true]"#));
}

#[test_log::test]
fn test_allow_list_applies_recursively() {
    let inner = Object::from_pairs([("b", Value::from(1)), ("z", Value::from(2))]);
    let value = Value::from(Object::from_pairs([
        ("z", Value::from(0)),
        ("b", Value::from(vec![Value::from(inner)])),
        ("a", Value::from("x")),
    ]));
    let replacer = Replacer::allow_list(["a", "b", "a"]);
    assert_eq!(
        to_json_with(&value, &replacer, &Indent::none()).as_deref(),
        Some(r#"{"a":"x","b":[{"b":1}]}"#)
    );
}

#[test_log::test]
fn test_replacer_sees_holder_and_key() {
    let replacer = Function::native("replacer", |_, this, args| {
        let key = args[0].as_string().map(|k| k.to_string()).unwrap_or_default();
        match (key.as_str(), this) {
            ("", Value::Object(holder)) => {
                assert!(holder.contains_key(""));
                Ok(args[1].clone())
            }
            ("secret", _) => Ok(Value::Undefined),
            ("n", _) => Ok(Value::from(args[1].as_number().unwrap_or(0.0) * 10.0)),
            _ => Ok(args[1].clone()),
        }
    });
    let value = Value::from(Object::from_pairs([
        ("n", Value::from(2)),
        ("secret", Value::from("pw")),
        ("list", Value::from(vec![Value::from(1)])),
    ]));
    assert_eq!(
        to_json_with(&value, &Replacer::Function(replacer), &Indent::none()).as_deref(),
        Some(r#"{"n":20,"list":[1]}"#)
    );
}

#[test_log::test]
fn test_indent_is_capped() {
    let value = Value::from(vec![Value::from(1)]);
    let indent = Indent::string("abcdefghijklmnop");
    assert_eq!(
        to_json_with(&value, &Replacer::None, &indent).as_deref(),
        Some("[\nabcdefghij1\n]")
    );
    let indent = Indent::from_value(&Value::from(100));
    let text = to_json_with(&value, &Replacer::None, &indent).unwrap();
    assert_eq!(text, format!("[\n{}1\n]", " ".repeat(10)));
}

#[test_log::test]
fn test_cycle_through_array() {
    let object = Object::new();
    let array = Value::from(vec![Value::from(object.clone())]);
    object.set("back", array.clone());
    let err = stringify(&array, &Replacer::None, &Indent::none(), &mut NativeInvoker::new())
        .unwrap_err();
    assert!(matches!(err, Error::Type(NESTED_TOO_DEEP)));
    assert_eq!(
        err.to_string(),
        "TypeError: Nested too deep or a cyclic structure"
    );
}

#[test_log::test]
fn test_custom_depth_limit() {
    type Shallow = CodecLimits<2, 16, 10>;
    let two = Value::from(vec![Value::from(vec![Value::from(1)])]);
    let three = Value::from(vec![two.clone()]);
    let mut invoker = NativeInvoker::new();
    let text = stringify_with::<Shallow>(&two, &Replacer::None, &Indent::none(), &mut invoker)
        .unwrap()
        .unwrap();
    assert_eq!(text.as_str(), Some("[[1]]"));
    assert!(
        stringify_with::<Shallow>(&three, &Replacer::None, &Indent::none(), &mut invoker).is_err()
    );
}

#[test_log::test]
fn test_array_to_json_hook() {
    let tagged = Array::from_vec(vec![Value::from(1), Value::from(2)]);
    tagged.object().set(
        "toJSON",
        Value::from(Function::native("toJSON", |_, this, args| {
            let len = this.as_array().map_or(0, Array::len);
            let key = args[0].as_string().map(|k| k.to_string()).unwrap_or_default();
            Ok(Value::from(format!("{key}:{len}")))
        })),
    );
    let value = Value::from(Object::from_pairs([
        ("x", Value::from(tagged.clone())),
        ("y", Value::from(vec![Value::from(3)])),
    ]));
    assert_eq!(to_json(&value).as_deref(), Some(r#"{"x":"x:2","y":[3]}"#));
    assert_eq!(to_json(&Value::from(tagged)).as_deref(), Some(r#"":2""#));
}

#[test_log::test]
fn test_keys_resolved_against_snapshot() {
    // Deleting a later key skips it; a key added mid-walk is never visited.
    let replacer = Function::native("mutate", |_, this, args| {
        let key = args[0].as_string().map(|k| k.to_string()).unwrap_or_default();
        if let (Value::Object(holder), "a") = (this, key.as_str()) {
            holder.delete("b");
            holder.set("c", Value::from(3));
        }
        Ok(args[1].clone())
    });
    let object = Object::from_pairs([("a", Value::from(1)), ("b", Value::from(2))]);
    let value = Value::from(object.clone());
    assert_eq!(
        to_json_with(&value, &Replacer::Function(replacer), &Indent::none()).as_deref(),
        Some(r#"{"a":1}"#)
    );
    assert_eq!(object.get_own("c"), Some(Value::from(3)));
}
