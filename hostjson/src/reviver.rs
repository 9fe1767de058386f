// SPDX-License-Identifier: Apache-2.0

//! Bottom-up reviver traversal over a freshly parsed value graph.

use core::marker::PhantomData;

use crate::config::{CodecConfig, DefaultConfig};
use crate::error::{Error, UnexpectedState};
use crate::frame::{Frame, FrameStack};
use crate::invoke::{Call, Resumable, Step};
use crate::value::{Function, JsString, Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the next key to visit.
    Begin,
    /// Waiting for the reviver's result for `pending_key`.
    AfterCallback,
}

/// Resumable reviver walk.
///
/// The root is stored as property `""` of a synthetic holder object. Every
/// property is visited after its children (post-order) and replaced by the
/// reviver's return value; an `undefined` result deletes an object property
/// but is stored as-is into an array slot.
pub struct Reviver<C: CodecConfig = DefaultConfig> {
    reviver: Function,
    holder: Object,
    stack: FrameStack<Phase>,
    finished: bool,
    _config: PhantomData<C>,
}

impl Reviver<DefaultConfig> {
    pub fn new(root: Value, reviver: Function) -> Result<Self, Error> {
        Self::with_config(root, reviver)
    }
}

impl<C: CodecConfig> Reviver<C> {
    pub fn with_config(root: Value, reviver: Function) -> Result<Self, Error> {
        let holder = Object::new();
        holder.set(JsString::empty(), root);
        // The holder frame sits below the counted container levels.
        let mut stack = FrameStack::new(C::MAX_DEPTH + 1);
        stack.push(Frame::snapshot(Value::Object(holder.clone()), Phase::Begin))?;
        Ok(Self {
            reviver,
            holder,
            stack,
            finished: false,
            _config: PhantomData,
        })
    }

    /// Store the reviver's result for the key in flight and move past it.
    fn apply(&mut self, result: Value) -> Result<(), Error> {
        let frame = self.stack.top_mut()?;
        let key = frame
            .pending_key
            .take()
            .ok_or(UnexpectedState::MissingResumeValue)?;
        match &frame.container {
            Value::Object(object) if result.is_undefined() => {
                object.delete(&key);
            }
            Value::Object(object) => object.set(key, result),
            Value::Array(array) => {
                // A slot truncated away by the callback is ignored.
                array.set(frame.index, result);
            }
            _ => {}
        }
        frame.index += 1;
        frame.phase = Phase::Begin;
        Ok(())
    }

    /// Suspend on the reviver for `key` of the top frame's container.
    fn callback(&mut self, key: JsString, value: Value) -> Result<Step<Value>, Error> {
        let frame = self.stack.top_mut()?;
        log::trace!("revive {key:?}");
        frame.phase = Phase::AfterCallback;
        frame.pending_key = Some(key.clone());
        Ok(Step::Call(Call {
            function: self.reviver.clone(),
            this: frame.container.clone(),
            args: vec![Value::String(key), value],
        }))
    }
}

impl<C: CodecConfig> Resumable for Reviver<C> {
    type Output = Value;

    fn resume(&mut self, retval: Option<Value>) -> Result<Step<Value>, Error> {
        if self.finished {
            return Err(UnexpectedState::AlreadyFinished.into());
        }
        match (self.stack.top()?.phase, retval) {
            (Phase::AfterCallback, Some(result)) => self.apply(result)?,
            (Phase::AfterCallback, None) => {
                return Err(UnexpectedState::MissingResumeValue.into())
            }
            (Phase::Begin, Some(_)) => {
                return Err(UnexpectedState::UnexpectedResumeValue.into())
            }
            (Phase::Begin, None) => {}
        }

        loop {
            let frame = self.stack.top_mut()?;

            if frame.is_exhausted() {
                let done = self.stack.pop()?;
                if self.stack.is_empty() {
                    self.finished = true;
                    return Ok(Step::Done(self.holder.get_own("").unwrap_or_default()));
                }
                let parent = self.stack.top()?;
                let key = parent
                    .current_key()
                    .ok_or(UnexpectedState::EmptyFrameStack)?;
                return self.callback(key, done.container);
            }

            let (key, value) = match &frame.container {
                Value::Object(object) => {
                    let key = frame.keys[frame.index].clone();
                    match object.get_own_property(&key) {
                        Some(prop) if prop.enumerable => (key, prop.value),
                        _ => {
                            // Removed or hidden since the snapshot.
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

            if value.is_non_empty_container() {
                self.stack.push(Frame::snapshot(value, Phase::Begin))?;
                continue;
            }
            return self.callback(key, value);
        }
    }
}
