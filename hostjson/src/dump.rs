// SPDX-License-Identifier: Apache-2.0

//! Human-oriented rendering of a value graph for consoles and logs.
//!
//! Unlike stringify, dump shows every value kind: keys are unquoted, strings
//! use single quotes, boxed primitives and callables get bracketed labels,
//! and host externals are described by their prototype. Output is not meant
//! to be parsed back.

use crate::chunk_buffer::ChunkBuffer;
use crate::config::{CodecConfig, DefaultConfig};
use crate::error::{Error, UnexpectedState};
use crate::escape_processor::EscapeProcessor;
use crate::frame::{Frame, FrameStack};
use crate::number::format_number;
use crate::value::{External, JsString, Primitive, Value};

/// Render `value` for inspection.
///
/// `console` writes a top-level string without quotes. `indent` is the
/// number of spaces per nesting level, capped like the stringify indent;
/// 0 renders on one line.
pub fn dump(value: &Value, console: bool, indent: usize) -> Result<JsString, Error> {
    dump_with::<DefaultConfig>(value, console, indent)
}

/// [`dump`] with a custom [`CodecConfig`].
pub fn dump_with<C: CodecConfig>(
    value: &Value,
    console: bool,
    indent: usize,
) -> Result<JsString, Error> {
    let mut dumper = Dumper {
        out: ChunkBuffer::new(C::CHUNK_MIN_SIZE),
        stack: FrameStack::new(C::MAX_DEPTH),
        indent: indent.min(C::MAX_INDENT),
    };
    if !is_dump_container(value) {
        match value {
            Value::String(s) if console => dumper.out.append(s.as_bytes())?,
            _ => dumper.write_leaf(value)?,
        }
    } else {
        dumper.walk(value.clone())?;
    }
    Ok(JsString::from_vec(dumper.out.flatten()?))
}

/// Values rendered by descending into them.
fn is_dump_container(value: &Value) -> bool {
    match value {
        Value::Object(_) | Value::Array(_) => true,
        Value::External(external) => external.has_members(),
        _ => false,
    }
}

struct Dumper {
    out: ChunkBuffer,
    stack: FrameStack<()>,
    indent: usize,
}

impl Dumper {
    fn newline(&mut self, level: usize) -> Result<(), Error> {
        if self.indent == 0 {
            return Ok(());
        }
        self.out.push(b'\n')?;
        self.out.fill(b' ', level.saturating_mul(self.indent))
    }

    fn open(&mut self, value: Value) -> Result<(), Error> {
        let open = if matches!(value, Value::Array(_)) { b'[' } else { b'{' };
        let frame = match &value {
            Value::External(external) => {
                let names = external.member_names();
                Frame::new(value.clone(), names, ())
            }
            _ => Frame::snapshot(value, ()),
        };
        self.stack.push(frame)?;
        self.out.push(open)
    }

    fn walk(&mut self, root: Value) -> Result<(), Error> {
        self.open(root)?;

        loop {
            let level = self.stack.depth();
            let frame = self.stack.top_mut()?;

            if frame.is_exhausted() {
                let written = frame.written;
                let close = if frame.is_array() { b']' } else { b'}' };
                if written {
                    self.newline(level - 1)?;
                }
                self.out.push(close)?;
                self.stack.pop()?;
                if self.stack.is_empty() {
                    return Ok(());
                }
                continue;
            }

            let index = frame.index;
            frame.index += 1;
            let entry = match &frame.container {
                Value::Object(object) => {
                    let key = frame.keys[index].clone();
                    object
                        .get_own_property(&key)
                        .filter(|prop| prop.enumerable)
                        .map(|prop| (Some(key), prop.value))
                }
                Value::External(external) => {
                    let key = frame.keys[index].clone();
                    external
                        .member(&key)
                        .map(|member| (Some(key), Value::External(member)))
                }
                Value::Array(array) => Some((None, array.get(index).unwrap_or_default())),
                _ => return Err(UnexpectedState::EmptyFrameStack.into()),
            };
            let Some((key, value)) = entry else {
                continue;
            };

            if frame.written {
                self.out.push(b',')?;
            }
            frame.written = true;
            self.newline(level)?;
            if let Some(key) = key {
                self.out.append(key.as_bytes())?;
                self.out.push(b':')?;
                if self.indent != 0 {
                    self.out.push(b' ')?;
                }
            }

            if is_dump_container(&value) {
                self.open(value)?;
            } else {
                self.write_leaf(&value)?;
            }
        }
    }

    fn write_leaf(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Undefined => self.out.append(b"undefined"),
            Value::Null => self.out.append(b"null"),
            Value::Boolean(b) => self.out.append(if *b { b"true" } else { b"false" }),
            Value::Number(n) => self.out.append(format_number(*n).as_bytes()),
            Value::String(s) => EscapeProcessor::write_quoted(&mut self.out, s.as_bytes(), b'\''),
            Value::Boxed(boxed) => match boxed.primitive() {
                Primitive::String(s) => {
                    self.out.append(b"[String: ")?;
                    EscapeProcessor::write_quoted(&mut self.out, s.as_bytes(), b'\'')?;
                    self.out.push(b']')
                }
                Primitive::Number(n) => {
                    self.out.append(b"[Number: ")?;
                    self.out.append(format_number(*n).as_bytes())?;
                    self.out.push(b']')
                }
                Primitive::Boolean(true) => self.out.append(b"[Boolean: true]"),
                Primitive::Boolean(false) => self.out.append(b"[Boolean: false]"),
            },
            Value::Function(function) if function.is_native() => {
                self.out.append(b"[Function: native]")
            }
            Value::Function(_) => self.out.append(b"[Function]"),
            Value::External(external) => self.write_external(external),
            // Containers are walked, never written as leaves.
            Value::Object(_) | Value::Array(_) => self.out.append(b"{}"),
        }
    }

    /// `{type:"<kind>",props:[<hooks>]}`
    fn write_external(&mut self, external: &External) -> Result<(), Error> {
        self.out.append(b"{type:\"")?;
        self.out.append(external.kind().as_str().as_bytes())?;
        self.out.append(b"\",props:[")?;
        let hooks = external.hooks();
        let names = [
            (hooks.getter, "getter"),
            (hooks.setter, "setter"),
            (hooks.method, "method"),
            (hooks.find, "find"),
            (hooks.foreach, "foreach"),
            (hooks.next, "next"),
        ];
        let mut written = false;
        for (_, name) in names.iter().filter(|(present, _)| *present) {
            if written {
                self.out.push(b',')?;
            }
            written = true;
            EscapeProcessor::write_quoted(&mut self.out, name.as_bytes(), b'"')?;
        }
        self.out.append(b"]}")
    }
}
