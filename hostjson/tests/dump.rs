// SPDX-License-Identifier: Apache-2.0

#![cfg(feature = "dump")]

use hostjson::{
    dump, dump_with, parse, Boxed, CodecLimits, ExternHooks, ExternKind, External, Function,
    NativeInvoker, Object, Primitive, Value,
};

#[test_log::test]
fn test_dump_parsed_document() {
    let value = parse(
        br#"{"name":"it's","list":[1,true,null],"empty":[]}"#,
        None,
        &mut NativeInvoker::new(),
    )
    .unwrap();
    let text = dump(&value, false, 0).unwrap();
    assert_eq!(
        text.as_str(),
        Some(r"{name:'it\'s',list:[1,true,null],empty:[]}")
    );
    let text = dump(&value, false, 2).unwrap();
    assert_eq!(
        text.as_str(),
        Some("{\n  name: 'it\\'s',\n  list: [\n    1,\n    true,\n    null\n  ],\n  empty: []\n}")
    );
}

#[test_log::test]
fn test_dump_shows_what_stringify_drops() {
    let value = Value::from(Object::from_pairs([
        ("u", Value::Undefined),
        ("n", Value::from(f64::NEG_INFINITY)),
        ("f", Value::from(Function::native("f", |_, _, _| Ok(Value::Undefined)))),
        ("b", Value::from(Boxed::new(Primitive::Number(-0.0)))),
    ]));
    let text = dump(&value, false, 0).unwrap();
    assert_eq!(
        text.as_str(),
        Some("{u:undefined,n:-Infinity,f:[Function: native],b:[Number: 0]}")
    );
}

#[test_log::test]
fn test_dump_console_mode() {
    let text = dump(&Value::from("plain\ntext"), true, 0).unwrap();
    assert_eq!(text.as_str(), Some("plain\ntext"));
    let text = dump(&Value::from("plain\ntext"), false, 0).unwrap();
    assert_eq!(text.as_str(), Some(r"'plain\ntext'"));
}

#[test_log::test]
fn test_dump_external_tree() {
    let hooks = ExternHooks {
        getter: true,
        setter: true,
        ..Default::default()
    };
    let headers = External::new(
        "headers",
        ExternKind::CaselessObject,
        ExternHooks {
            find: true,
            foreach: true,
            next: true,
            ..Default::default()
        },
        Vec::new(),
    );
    let uri = External::new("uri", ExternKind::Property, hooks, Vec::new());
    let request = External::new(
        "request",
        ExternKind::Object,
        ExternHooks::default(),
        vec![uri, headers],
    );
    let text = dump(&Value::from(request), false, 0).unwrap();
    assert_eq!(
        text.as_str(),
        Some(
            r#"{uri:{type:"property",props:["getter","setter"]},headers:{type:"caseless_object",props:["find","foreach","next"]}}"#
        )
    );
}

#[test_log::test]
fn test_dump_depth_cap() {
    type Shallow = CodecLimits<2, 16, 10>;
    let two = Value::from(vec![Value::from(vec![Value::from(1)])]);
    assert_eq!(
        dump_with::<Shallow>(&two, false, 0).unwrap().as_str(),
        Some("[[1]]")
    );
    let three = Value::from(vec![two]);
    assert!(dump_with::<Shallow>(&three, false, 0).is_err());
}
