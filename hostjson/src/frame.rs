// SPDX-License-Identifier: Apache-2.0

//! Saved traversal levels for the revive, stringify and dump engines.

use crate::error::{Error, UnexpectedState};
use crate::value::{JsString, Value};

/// Raised when a traversal would exceed the frame cap.
pub const NESTED_TOO_DEEP: &str = "Nested too deep or a cyclic structure";

/// One level of container traversal.
///
/// `P` is the engine-specific phase tag.
pub struct Frame<P> {
    /// The object or array being walked.
    pub container: Value,
    /// Enumeration keys captured when the frame was created (objects only).
    pub keys: Vec<JsString>,
    /// Next key or element to visit.
    pub index: usize,
    pub phase: P,
    /// Whether a child has been written, for separator placement.
    pub written: bool,
    /// Key of the property whose callback is in flight.
    pub pending_key: Option<JsString>,
}

impl<P> Frame<P> {
    pub fn new(container: Value, keys: Vec<JsString>, phase: P) -> Self {
        Self {
            container,
            keys,
            index: 0,
            phase,
            written: false,
            pending_key: None,
        }
    }

    /// Frame over `container` with a snapshot of its own enumerable keys.
    pub fn snapshot(container: Value, phase: P) -> Self {
        let keys = match &container {
            Value::Object(object) => object.own_enumerable_keys(),
            _ => Vec::new(),
        };
        Self::new(container, keys, phase)
    }

    pub fn is_array(&self) -> bool {
        matches!(self.container, Value::Array(_))
    }

    /// Number of visitable entries; arrays report their live length.
    pub fn len(&self) -> usize {
        match &self.container {
            Value::Array(array) => array.len(),
            _ => self.keys.len(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.len()
    }

    /// Key at the current index: the snapshot key, or the decimal index.
    pub fn current_key(&self) -> Option<JsString> {
        match &self.container {
            Value::Array(_) => Some(JsString::from_index(self.index)),
            _ => self.keys.get(self.index).cloned(),
        }
    }
}

/// Bounded stack of frames.
pub struct FrameStack<P> {
    frames: Vec<Frame<P>>,
    max_frames: usize,
}

impl<P> FrameStack<P> {
    /// Create a stack that accepts at most `max_frames` frames.
    pub fn new(max_frames: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_frames,
        }
    }

    /// Push a frame, failing with the cyclic-structure error when full.
    pub fn push(&mut self, frame: Frame<P>) -> Result<(), Error> {
        if self.frames.len() >= self.max_frames {
            log::debug!("frame cap of {} reached", self.max_frames);
            return Err(Error::Type(NESTED_TOO_DEEP));
        }
        self.frames.try_reserve(1)?;
        self.frames.push(frame);
        log::trace!("push frame, depth {}", self.frames.len());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Frame<P>, Error> {
        let frame = self.frames.pop().ok_or(UnexpectedState::EmptyFrameStack)?;
        log::trace!("pop frame, depth {}", self.frames.len());
        Ok(frame)
    }

    pub fn top(&self) -> Result<&Frame<P>, Error> {
        Ok(self.frames.last().ok_or(UnexpectedState::EmptyFrameStack)?)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame<P>, Error> {
        Ok(self
            .frames
            .last_mut()
            .ok_or(UnexpectedState::EmptyFrameStack)?)
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
