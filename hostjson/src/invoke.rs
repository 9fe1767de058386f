// SPDX-License-Identifier: Apache-2.0

//! Suspension protocol between the traversal engines and the host evaluator.
//!
//! The revive and stringify engines never call user code themselves. Each
//! callback is returned as a [`Step::Call`]; whoever drives the engine runs
//! the callable and passes the result back into [`Resumable::resume`]. The
//! engine keeps all traversal state in its frame stack, so the driver may be
//! the simple loop in [`run`] or a host scheduler that interleaves other work.

use crate::error::Error;
use crate::value::{Function, FunctionKind, Value};

/// A callback the engine wants run before it can continue.
#[derive(Debug, Clone)]
pub struct Call {
    pub function: Function,
    pub this: Value,
    pub args: Vec<Value>,
}

/// Outcome of one [`Resumable::resume`].
#[derive(Debug)]
pub enum Step<T> {
    /// Run this callable and resume with its return value.
    Call(Call),
    /// Traversal finished.
    Done(T),
}

/// A traversal that can be suspended at each callback.
pub trait Resumable {
    type Output;

    /// Advance until the next callback or completion.
    ///
    /// `retval` must be `Some` exactly when the previous step was a
    /// [`Step::Call`]; otherwise the engine fails with an internal error.
    fn resume(&mut self, retval: Option<Value>) -> Result<Step<Self::Output>, Error>;
}

/// Runs callables on behalf of the engines.
pub trait Invoker {
    /// Call `function` with `this` and `args`.
    fn invoke(&mut self, function: &Function, this: &Value, args: &[Value])
        -> Result<Value, Error>;
}

/// Drive `machine` to completion, running each requested call on `invoker`.
///
/// A callback error aborts the traversal and is returned unchanged.
pub fn run<M: Resumable + ?Sized>(
    machine: &mut M,
    invoker: &mut dyn Invoker,
) -> Result<M::Output, Error> {
    let mut retval = None;
    loop {
        match machine.resume(retval.take())? {
            Step::Done(output) => return Ok(output),
            Step::Call(call) => {
                log::trace!("suspend for {:?}", call.function);
                retval = Some(invoker.invoke(&call.function, &call.this, &call.args)?);
            }
        }
    }
}

/// Invoker for [`FunctionKind::Native`] callables.
///
/// Native callables receive the invoker itself, so a callback that reenters
/// parse or stringify shares the call-depth budget with its caller.
pub struct NativeInvoker {
    depth: usize,
    max_depth: usize,
}

impl NativeInvoker {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn new() -> Self {
        Self::with_max_depth(Self::DEFAULT_MAX_DEPTH)
    }

    /// Limit the number of nested native calls.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Current number of native calls in progress.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for NativeInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker for NativeInvoker {
    fn invoke(
        &mut self,
        function: &Function,
        this: &Value,
        args: &[Value],
    ) -> Result<Value, Error> {
        let native = match function.kind() {
            FunctionKind::Native(native) => native,
            FunctionKind::Host(_) => {
                return Err(Error::Type("host function is not callable here"))
            }
        };
        if self.depth >= self.max_depth {
            return Err(Error::Range("Maximum call stack size exceeded"));
        }
        self.depth += 1;
        let result = {
            let invoker: &mut dyn Invoker = self;
            native(invoker, this, args)
        };
        self.depth -= 1;
        result
    }
}
