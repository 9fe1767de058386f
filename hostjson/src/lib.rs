// SPDX-License-Identifier: Apache-2.0

//! JSON `parse` and `stringify` for embedded script hosts.
//!
//! Text is parsed into the host's value graph ([`Value`]); stringify walks a
//! graph back to text. User callbacks (a reviver, a replacer function, or a
//! value's `toJSON` method) are never called from inside the engines: the
//! [`Reviver`] and [`Stringifier`] traversals suspend with a [`Step::Call`]
//! and are resumed with the callback's result, so a host evaluator can run
//! the callback on its own terms. [`run`] drives a traversal with any
//! [`Invoker`].
//!
//! ```
//! use hostjson::{parse, stringify, Indent, NativeInvoker, Replacer};
//!
//! let mut invoker = NativeInvoker::new();
//! let value = parse(br#"{"a":[1,2],"b":"x"}"#, None, &mut invoker).unwrap();
//! let text = stringify(&value, &Replacer::None, &Indent::spaces(1), &mut invoker)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(text.as_str(), Some("{\n \"a\": [\n  1,\n  2\n ],\n \"b\": \"x\"\n}"));
//! ```

mod config;
pub use config::{CodecConfig, CodecLimits, DefaultConfig};

mod error;
pub use error::{Error, SyntaxKind, UnexpectedState};

mod value;
pub use value::{
    Array, Boxed, ExternHooks, ExternKind, External, Function, FunctionKind, JsString, NativeFn,
    Object, Primitive, Property, Value,
};

mod chunk_buffer;
pub use chunk_buffer::ChunkBuffer;

mod escape_processor;
pub use escape_processor::EscapeProcessor;

mod number;
pub use number::{format_number, scan_number};

mod parser;
pub use parser::{code_point_position, parse_value, Parser};

mod frame;
pub use frame::NESTED_TOO_DEEP;

mod invoke;
pub use invoke::{run, Call, Invoker, NativeInvoker, Resumable, Step};

mod reviver;
pub use reviver::Reviver;

mod stringify;
pub use stringify::{Indent, Replacer, Stringifier};

mod json;
pub use json::{parse, parse_with, stringify, stringify_with};

#[cfg(feature = "dump")]
mod dump;
#[cfg(feature = "dump")]
pub use dump::{dump, dump_with};

pub mod builtin;
