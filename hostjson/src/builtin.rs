// SPDX-License-Identifier: Apache-2.0

//! The script-visible `JSON` namespace object.

use crate::config::{CodecConfig, DefaultConfig};
use crate::error::Error;
use crate::invoke::Invoker;
use crate::json;
use crate::number::format_number;
use crate::stringify::{Indent, Replacer};
use crate::value::{Function, JsString, Object, Primitive, Value};

/// Build a `JSON` object carrying non-enumerable `parse` and `stringify`.
pub fn json_object() -> Object {
    let namespace = Object::new();
    namespace.define("parse", Value::from(Function::native("parse", parse)), false);
    namespace.define(
        "stringify",
        Value::from(Function::native("stringify", stringify)),
        false,
    );
    namespace
}

/// Define `JSON` on `global` as a non-enumerable property.
pub fn install(global: &Object) -> Object {
    let namespace = json_object();
    global.define("JSON", Value::from(namespace.clone()), false);
    log::debug!("installed JSON namespace");
    namespace
}

/// `JSON.parse(text, reviver)`
fn parse(invoker: &mut dyn Invoker, _this: &Value, args: &[Value]) -> Result<Value, Error> {
    let text = to_js_string(args.first().unwrap_or(&Value::Undefined));
    let reviver = args.get(1).and_then(Value::as_function);
    json::parse(text.as_bytes(), reviver, invoker)
}

/// `JSON.stringify(value, replacer, space)`
fn stringify(invoker: &mut dyn Invoker, _this: &Value, args: &[Value]) -> Result<Value, Error> {
    let value = args.first().cloned().unwrap_or_default();
    let replacer = args.get(1).map(Replacer::from_value).unwrap_or_default();
    let indent = args.get(2).map(Indent::from_value).unwrap_or_default();
    Ok(json::stringify(&value, &replacer, &indent, invoker)?
        .map(Value::String)
        .unwrap_or_default())
}

/// String conversion applied to the `text` argument of `parse`.
pub fn to_js_string(value: &Value) -> JsString {
    match value {
        Value::String(s) => s.clone(),
        Value::Boxed(boxed) => match boxed.primitive() {
            Primitive::String(s) => s.clone(),
            Primitive::Number(n) => JsString::from(format_number(*n)),
            Primitive::Boolean(b) => JsString::from(if *b { "true" } else { "false" }),
        },
        _ => {
            let mut out = String::new();
            append_string(value, &mut out, DefaultConfig::MAX_DEPTH);
            JsString::from(out)
        }
    }
}

fn append_string(value: &Value, out: &mut String, depth: usize) {
    match value {
        Value::Undefined => out.push_str("undefined"),
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => out.push_str(&String::from_utf8_lossy(s.as_bytes())),
        Value::Boxed(boxed) => {
            let primitive = Value::from(boxed.primitive().clone());
            append_string(&primitive, out, depth);
        }
        // Array elements are joined with ',', holes and nullish elements
        // become empty; a cycle past the depth cap renders as empty.
        Value::Array(array) => {
            if depth == 0 {
                return;
            }
            for (index, element) in array.to_vec().iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                if !element.is_undefined() && !element.is_null() {
                    append_string(element, out, depth - 1);
                }
            }
        }
        Value::Function(function) => {
            out.push_str("function ");
            out.push_str(&function.name().to_string());
            out.push_str("() { [native code] }");
        }
        Value::Object(_) | Value::External(_) => out.push_str("[object Object]"),
    }
}
