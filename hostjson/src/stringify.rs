// SPDX-License-Identifier: Apache-2.0

//! Resumable serialization with `toJSON` and replacer hooks.

use core::marker::PhantomData;

use crate::chunk_buffer::ChunkBuffer;
use crate::config::{CodecConfig, DefaultConfig};
use crate::error::{Error, UnexpectedState};
use crate::escape_processor::EscapeProcessor;
use crate::frame::{Frame, FrameStack};
use crate::invoke::{Call, Resumable, Step};
use crate::number::format_number;
use crate::value::{Function, JsString, Object, Primitive, Value};

/// How property values and keys are filtered during stringify.
#[derive(Debug, Clone, Default)]
pub enum Replacer {
    #[default]
    None,
    /// Called as `replacer.call(holder, key, value)` for every property.
    Function(Function),
    /// Ordered, de-duplicated keys; the enumeration order of plain objects.
    AllowList(Vec<JsString>),
}

impl Replacer {
    /// Build an allow-list, keeping the first occurrence of each key.
    pub fn allow_list<K, I>(keys: I) -> Self
    where
        K: Into<JsString>,
        I: IntoIterator<Item = K>,
    {
        let mut list: Vec<JsString> = Vec::new();
        for key in keys {
            let key = key.into();
            if !list.contains(&key) {
                list.push(key);
            }
        }
        Replacer::AllowList(list)
    }

    /// Interpret a script-level `replacer` argument.
    ///
    /// A callable is used as-is. An array is collapsed into an allow-list of
    /// its string, number, boxed string and boxed number elements; other
    /// elements are ignored. Anything else means no replacer.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Function(function) => Replacer::Function(function.clone()),
            Value::Array(array) => Self::allow_list(
                array
                    .to_vec()
                    .iter()
                    .filter_map(|element| match element {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(JsString::from(format_number(*n))),
                        Value::Boxed(boxed) => match boxed.primitive() {
                            Primitive::String(s) => Some(s.clone()),
                            Primitive::Number(n) => Some(JsString::from(format_number(*n))),
                            Primitive::Boolean(_) => None,
                        },
                        _ => None,
                    }),
            ),
            _ => Replacer::None,
        }
    }
}

/// Indentation unit for pretty-printing; empty means compact output.
///
/// The unit is cut to the configured maximum number of characters when a
/// stringify starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indent(Vec<u8>);

impl Indent {
    pub fn none() -> Self {
        Self::default()
    }

    /// `count` spaces per level.
    pub fn spaces(count: usize) -> Self {
        Self(vec![b' '; count])
    }

    /// A literal indentation string.
    pub fn string(unit: impl AsRef<[u8]>) -> Self {
        Self(unit.as_ref().to_vec())
    }

    /// Interpret a script-level `space` argument: a string (or boxed
    /// string) is used literally, a positive finite number (or boxed
    /// number) gives that many spaces, anything else means compact.
    pub fn from_value(value: &Value) -> Self {
        let primitive = match value {
            Value::String(s) => Primitive::String(s.clone()),
            Value::Number(n) => Primitive::Number(*n),
            Value::Boxed(boxed) => boxed.primitive().clone(),
            _ => return Self::none(),
        };
        let max = DefaultConfig::MAX_INDENT;
        match primitive {
            Primitive::String(s) => Self(truncate_chars(s.as_bytes(), max).to_vec()),
            Primitive::Number(n) if n.is_finite() && n >= 1.0 => {
                Self::spaces((n.trunc() as usize).min(max))
            }
            _ => Self::none(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First `max` characters of `bytes`; bytes that are not UTF-8 count one each.
fn truncate_chars(bytes: &[u8], max: usize) -> &[u8] {
    match core::str::from_utf8(bytes) {
        Ok(s) => match s.char_indices().nth(max) {
            Some((end, _)) => &bytes[..end],
            None => bytes,
        },
        Err(_) => &bytes[..bytes.len().min(max)],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the next key to visit.
    Begin,
    /// Waiting for `toJSON` of the value under `pending_key`.
    ToJsonCalled,
    /// Waiting for the replacer's result for `pending_key`.
    ReplacerCalled,
}

/// Resumable stringify walk.
///
/// The root is written as property `""` of a synthetic holder object, so the
/// buffer always holds `{"":<root>}` (pretty: `{\n"": <root>\n}`); the wrapper
/// is stripped when the walk finishes.
pub struct Stringifier<C: CodecConfig = DefaultConfig> {
    replacer: Option<Function>,
    allow_list: Option<Vec<JsString>>,
    indent: Vec<u8>,
    out: ChunkBuffer,
    stack: FrameStack<Phase>,
    finished: bool,
    _config: PhantomData<C>,
}

impl Stringifier<DefaultConfig> {
    pub fn new(value: Value, replacer: &Replacer, indent: &Indent) -> Result<Self, Error> {
        Self::with_config(value, replacer, indent)
    }
}

impl<C: CodecConfig> Stringifier<C> {
    pub fn with_config(value: Value, replacer: &Replacer, indent: &Indent) -> Result<Self, Error> {
        let (replacer, allow_list) = match replacer {
            Replacer::None => (None, None),
            Replacer::Function(function) => (Some(function.clone()), None),
            Replacer::AllowList(keys) => (None, Some(keys.clone())),
        };
        let holder = Object::new();
        holder.set(JsString::empty(), value);

        let mut stringifier = Self {
            replacer,
            allow_list,
            indent: truncate_chars(indent.as_bytes(), C::MAX_INDENT).to_vec(),
            out: ChunkBuffer::new(C::CHUNK_MIN_SIZE),
            // The holder frame sits below the counted container levels.
            stack: FrameStack::new(C::MAX_DEPTH + 1),
            finished: false,
            _config: PhantomData,
        };
        stringifier.stack.push(Frame::new(
            Value::Object(holder),
            vec![JsString::empty()],
            Phase::Begin,
        ))?;
        stringifier.out.push(b'{')?;
        Ok(stringifier)
    }

    /// Indentation level of the children of the top frame; the holder is 0.
    fn level(&self) -> usize {
        self.stack.depth().saturating_sub(1)
    }

    fn newline(&mut self, level: usize) -> Result<(), Error> {
        if self.indent.is_empty() {
            return Ok(());
        }
        self.out.push(b'\n')?;
        for _ in 0..level {
            self.out.append(&self.indent)?;
        }
        Ok(())
    }

    /// Continue after `toJSON`: hand the value to the replacer, or write it.
    fn replace_or_write(
        &mut self,
        value: Value,
    ) -> Result<Option<Step<Option<JsString>>>, Error> {
        let Some(replacer) = self.replacer.clone() else {
            self.write_property(value)?;
            return Ok(None);
        };
        let frame = self.stack.top_mut()?;
        let key = frame
            .pending_key
            .clone()
            .ok_or(UnexpectedState::MissingResumeValue)?;
        frame.phase = Phase::ReplacerCalled;
        log::trace!("replacer for {key:?}");
        Ok(Some(Step::Call(Call {
            function: replacer,
            this: frame.container.clone(),
            args: vec![Value::String(key), value],
        })))
    }

    /// Write the final value of the pending property into the top frame.
    fn write_property(&mut self, value: Value) -> Result<(), Error> {
        let frame = self.stack.top_mut()?;
        let key = frame
            .pending_key
            .take()
            .ok_or(UnexpectedState::MissingResumeValue)?;
        frame.index += 1;
        frame.phase = Phase::Begin;

        let in_array = frame.is_array();
        if !in_array && (value.is_undefined() || value.is_callable()) {
            return Ok(());
        }
        let first = !frame.written;
        frame.written = true;

        if !first {
            self.out.push(b',')?;
        }
        self.newline(self.level())?;
        if !in_array {
            EscapeProcessor::write_quoted(&mut self.out, key.as_bytes(), b'"')?;
            self.out.push(b':')?;
            if !self.indent.is_empty() {
                self.out.push(b' ')?;
            }
        }
        self.write_value(value)
    }

    fn write_value(&mut self, value: Value) -> Result<(), Error> {
        match value {
            Value::Undefined | Value::Null | Value::Function(_) | Value::External(_) => {
                self.out.append(b"null")
            }
            Value::Boolean(b) => self.write_boolean(b),
            Value::Number(n) => self.write_number(n),
            Value::String(s) => EscapeProcessor::write_quoted(&mut self.out, s.as_bytes(), b'"'),
            Value::Boxed(boxed) => match boxed.primitive() {
                Primitive::Boolean(b) => self.write_boolean(*b),
                Primitive::Number(n) => self.write_number(*n),
                Primitive::String(s) => {
                    EscapeProcessor::write_quoted(&mut self.out, s.as_bytes(), b'"')
                }
            },
            Value::Object(object) => {
                let keys = match &self.allow_list {
                    Some(keys) => keys.clone(),
                    None => object.own_enumerable_keys(),
                };
                self.stack
                    .push(Frame::new(Value::Object(object), keys, Phase::Begin))?;
                self.out.push(b'{')
            }
            Value::Array(array) => {
                self.stack
                    .push(Frame::new(Value::Array(array), Vec::new(), Phase::Begin))?;
                self.out.push(b'[')
            }
        }
    }

    fn write_boolean(&mut self, b: bool) -> Result<(), Error> {
        self.out.append(if b { b"true" } else { b"false" })
    }

    fn write_number(&mut self, n: f64) -> Result<(), Error> {
        if n.is_finite() {
            self.out.append(format_number(n).as_bytes())
        } else {
            self.out.append(b"null")
        }
    }

    /// Strip the holder wrapper from the flattened output.
    fn finish(&mut self, root_written: bool) -> Result<Option<JsString>, Error> {
        self.finished = true;
        if !root_written {
            return Ok(None);
        }
        let out = core::mem::replace(&mut self.out, ChunkBuffer::new(1));
        let mut bytes = out.flatten()?;
        let (prefix, suffix): (&[u8], &[u8]) = if self.indent.is_empty() {
            (b"{\"\":", b"}")
        } else {
            (b"{\n\"\": ", b"\n}")
        };
        if bytes.len() < prefix.len() + suffix.len()
            || !bytes.starts_with(prefix)
            || !bytes.ends_with(suffix)
        {
            return Err(UnexpectedState::MissingHolderWrapper.into());
        }
        bytes.truncate(bytes.len() - suffix.len());
        bytes.drain(..prefix.len());
        Ok(Some(JsString::from_vec(bytes)))
    }
}

impl<C: CodecConfig> Resumable for Stringifier<C> {
    type Output = Option<JsString>;

    fn resume(&mut self, retval: Option<Value>) -> Result<Step<Option<JsString>>, Error> {
        if self.finished {
            return Err(UnexpectedState::AlreadyFinished.into());
        }
        match (self.stack.top()?.phase, retval) {
            (Phase::ToJsonCalled, Some(value)) => {
                if let Some(step) = self.replace_or_write(value)? {
                    return Ok(step);
                }
            }
            (Phase::ReplacerCalled, Some(value)) => self.write_property(value)?,
            (Phase::ToJsonCalled | Phase::ReplacerCalled, None) => {
                return Err(UnexpectedState::MissingResumeValue.into())
            }
            (Phase::Begin, Some(_)) => {
                return Err(UnexpectedState::UnexpectedResumeValue.into())
            }
            (Phase::Begin, None) => {}
        }

        loop {
            let listed = self.allow_list.is_some() && self.stack.depth() > 1;
            let frame = self.stack.top_mut()?;

            if frame.is_exhausted() {
                let written = frame.written;
                let close = if frame.is_array() { b']' } else { b'}' };
                if written {
                    self.newline(self.level().saturating_sub(1))?;
                }
                self.out.push(close)?;
                self.stack.pop()?;
                if self.stack.is_empty() {
                    return self.finish(written).map(Step::Done);
                }
                continue;
            }

            let (key, value) = match &frame.container {
                Value::Object(object) => {
                    let key = frame.keys[frame.index].clone();
                    let value = if listed {
                        object.get(&key)
                    } else {
                        object
                            .get_own_property(&key)
                            .filter(|prop| prop.enumerable)
                            .map(|prop| prop.value)
                    };
                    match value {
                        Some(value) => (key, value),
                        None => {
                            frame.index += 1;
                            continue;
                        }
                    }
                }
                Value::Array(array) => (
                    JsString::from_index(frame.index),
                    array.get(frame.index).unwrap_or_default(),
                ),
                _ => return Err(UnexpectedState::EmptyFrameStack.into()),
            };
            frame.pending_key = Some(key.clone());

            if let Some(hook) = value.to_json_hook() {
                frame.phase = Phase::ToJsonCalled;
                log::trace!("toJSON for {key:?}");
                return Ok(Step::Call(Call {
                    function: hook,
                    this: value,
                    args: vec![Value::String(key)],
                }));
            }
            if let Some(step) = self.replace_or_write(value)? {
                return Ok(step);
            }
        }
    }
}
