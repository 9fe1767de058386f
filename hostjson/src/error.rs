// SPDX-License-Identifier: Apache-2.0

use crate::value::Value;

/// What the parser tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    /// Input ended inside a value, or was blank.
    UnexpectedEnd,
    /// A byte that cannot start or continue the current production.
    UnexpectedToken,
    /// A `,` directly before `}` or `]`.
    TrailingComma,
    /// Container nesting exceeded the configured depth.
    NestedTooDeep,
    /// An unescaped control character inside a string.
    ForbiddenSourceChar,
    /// A backslash followed by an unsupported character.
    UnknownEscapeChar,
    /// `\u` not followed by four hex digits.
    InvalidUnicodeEscape,
    /// A lone low surrogate, or a high surrogate without a following `\u`.
    InvalidUnicodeChar,
    /// A high surrogate followed by something other than a low surrogate.
    InvalidSurrogatePair,
    /// A number literal missing its digits.
    UnexpectedNumber,
}

impl SyntaxKind {
    pub fn message(&self) -> &'static str {
        match self {
            SyntaxKind::UnexpectedEnd => "Unexpected end of input",
            SyntaxKind::UnexpectedToken => "Unexpected token",
            SyntaxKind::TrailingComma => "Trailing comma",
            SyntaxKind::NestedTooDeep => "Nested too deep",
            SyntaxKind::ForbiddenSourceChar => "Forbidden source char",
            SyntaxKind::UnknownEscapeChar => "Unknown escape char",
            SyntaxKind::InvalidUnicodeEscape => "Invalid Unicode escape sequence",
            SyntaxKind::InvalidUnicodeChar => "Invalid Unicode char",
            SyntaxKind::InvalidSurrogatePair => "Invalid surrogate pair",
            SyntaxKind::UnexpectedNumber => "Unexpected number",
        }
    }
}

/// Internal engine states that should never be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedState {
    /// Resumed after a callback without the callback's return value.
    MissingResumeValue,
    /// Resumed with a value while no callback was in flight.
    UnexpectedResumeValue,
    /// The frame stack ran empty before the traversal finished.
    EmptyFrameStack,
    /// Resumed after the traversal already produced its result.
    AlreadyFinished,
    /// The flattened output did not carry the holder wrapper.
    MissingHolderWrapper,
    /// More bytes committed than were reserved in the tail chunk.
    CommitBeyondReserve,
}

/// Errors raised by parse, stringify and dump
#[derive(Debug)]
pub enum Error {
    /// Grammar violation; `position` counts code points from the input start.
    Syntax { kind: SyntaxKind, position: usize },
    /// Cyclic or too deeply nested structure, or an uncallable callback.
    Type(&'static str),
    /// Host call-depth limit exceeded.
    Range(&'static str),
    /// An output chunk could not be allocated.
    Memory,
    /// The engine was driven incorrectly.
    Internal(UnexpectedState),
    /// A value thrown by a callback, propagated unchanged.
    Thrown(Value),
}

impl Error {
    pub fn syntax(kind: SyntaxKind, position: usize) -> Self {
        Error::Syntax { kind, position }
    }

    /// The syntax kind, if this is a syntax error.
    pub fn syntax_kind(&self) -> Option<SyntaxKind> {
        match self {
            Error::Syntax { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<UnexpectedState> for Error {
    fn from(info: UnexpectedState) -> Self {
        Error::Internal(info)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::Memory
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Syntax { kind, position } => {
                write!(f, "SyntaxError: {} at position {position}", kind.message())
            }
            Error::Type(msg) => write!(f, "TypeError: {msg}"),
            Error::Range(msg) => write!(f, "RangeError: {msg}"),
            Error::Memory => f.write_str("MemoryError"),
            Error::Internal(info) => write!(f, "InternalError: {info:?}"),
            Error::Thrown(value) => write!(f, "Uncaught {value:?}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let error: Error = UnexpectedState::EmptyFrameStack.into();
        match error {
            Error::Internal(info) => assert_eq!(info, UnexpectedState::EmptyFrameStack),
            _ => panic!("Expected Internal error"),
        }

        let error = Error::syntax(SyntaxKind::TrailingComma, 4);
        assert_eq!(error.syntax_kind(), Some(SyntaxKind::TrailingComma));
        assert_eq!(Error::Memory.syntax_kind(), None);
    }

    #[test]
    fn test_display() {
        let error = Error::syntax(SyntaxKind::UnexpectedEnd, 0);
        assert_eq!(
            error.to_string(),
            "SyntaxError: Unexpected end of input at position 0"
        );
        assert_eq!(
            Error::Type("Nested too deep or a cyclic structure").to_string(),
            "TypeError: Nested too deep or a cyclic structure"
        );
        assert_eq!(Error::Thrown(Value::from("boom")).to_string(), "Uncaught \"boom\"");
    }

    #[test]
    fn test_try_reserve_conversion() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        assert!(matches!(Error::from(err), Error::Memory));
    }
}
