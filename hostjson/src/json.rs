// SPDX-License-Identifier: Apache-2.0

//! Host-facing `parse` and `stringify` entry points.

use crate::config::{CodecConfig, DefaultConfig};
use crate::error::Error;
use crate::invoke::{run, Invoker};
use crate::parser::Parser;
use crate::reviver::Reviver;
use crate::stringify::{Indent, Replacer, Stringifier};
use crate::value::{Function, JsString, Value};

/// Parse `text` into a value graph, then apply `reviver` if given.
///
/// The reviver is only run over container roots; a scalar document is
/// returned as parsed.
pub fn parse(
    text: &[u8],
    reviver: Option<&Function>,
    invoker: &mut dyn Invoker,
) -> Result<Value, Error> {
    parse_with::<DefaultConfig>(text, reviver, invoker)
}

/// [`parse`] with a custom [`CodecConfig`].
pub fn parse_with<C: CodecConfig>(
    text: &[u8],
    reviver: Option<&Function>,
    invoker: &mut dyn Invoker,
) -> Result<Value, Error> {
    let value = Parser::<C>::with_config(text)
        .parse_document()
        .inspect_err(|err| log::debug!("parse failed: {err}"))?;
    log::debug!("parsed {} bytes into {}", text.len(), value.type_name());

    match reviver {
        Some(reviver) if value.is_container() => {
            let mut machine = Reviver::<C>::with_config(value, reviver.clone())?;
            run(&mut machine, invoker).inspect_err(|err| log::debug!("revive failed: {err}"))
        }
        _ => Ok(value),
    }
}

/// Serialize `value`.
///
/// Returns `None` when the root itself has no JSON form: `undefined`, a
/// callable, or anything a `toJSON` or replacer turned into one of those.
pub fn stringify(
    value: &Value,
    replacer: &Replacer,
    indent: &Indent,
    invoker: &mut dyn Invoker,
) -> Result<Option<JsString>, Error> {
    stringify_with::<DefaultConfig>(value, replacer, indent, invoker)
}

/// [`stringify`] with a custom [`CodecConfig`].
pub fn stringify_with<C: CodecConfig>(
    value: &Value,
    replacer: &Replacer,
    indent: &Indent,
    invoker: &mut dyn Invoker,
) -> Result<Option<JsString>, Error> {
    let mut machine = Stringifier::<C>::with_config(value.clone(), replacer, indent)?;
    let result =
        run(&mut machine, invoker).inspect_err(|err| log::debug!("stringify failed: {err}"))?;
    match &result {
        Some(text) => log::debug!("stringified {} into {} bytes", value.type_name(), text.size()),
        None => log::debug!("stringify of {} produced no value", value.type_name()),
    }
    Ok(result)
}
