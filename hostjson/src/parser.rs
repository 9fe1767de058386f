// SPDX-License-Identifier: Apache-2.0

use core::marker::PhantomData;

use crate::config::{CodecConfig, DefaultConfig};
use crate::error::{Error, SyntaxKind};
use crate::escape_processor::EscapeProcessor;
use crate::number::scan_number;
use crate::value::{Array, JsString, Object, Value};

/// Number of code points in `text[..offset]`, or 0 if that prefix is not UTF-8.
pub fn code_point_position(text: &[u8], offset: usize) -> usize {
    text.get(..offset)
        .and_then(|prefix| core::str::from_utf8(prefix).ok())
        .map(|prefix| prefix.chars().count())
        .unwrap_or(0)
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Recursive-descent parser from a byte slice into a value graph.
///
/// Generic over [`CodecConfig`] for the nesting limit.
pub struct Parser<'a, C: CodecConfig = DefaultConfig> {
    text: &'a [u8],
    pos: usize,
    depth: usize,
    _config: PhantomData<C>,
}

impl<'a> Parser<'a, DefaultConfig> {
    /// Creates a new parser for the given JSON text.
    ///
    /// # Example
    /// ```
    /// use hostjson::Parser;
    /// let value = Parser::new(br#"{"name": "value"}"#).parse_document().unwrap();
    /// assert!(value.is_container());
    /// ```
    pub fn new(text: &'a [u8]) -> Self {
        Self::with_config(text)
    }
}

impl<'a, C: CodecConfig> Parser<'a, C> {
    /// Creates a new parser with a custom [`CodecConfig`].
    pub fn with_config(text: &'a [u8]) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
            _config: PhantomData,
        }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parse the whole text as exactly one value surrounded by whitespace.
    pub fn parse_document(&mut self) -> Result<Value, Error> {
        let value = self.parse_value()?;
        self.skip_space();
        if self.pos != self.text.len() {
            return Err(self.error(SyntaxKind::UnexpectedToken, self.pos));
        }
        Ok(value)
    }

    /// Parse one value at the current position, skipping leading whitespace.
    pub fn parse_value(&mut self) -> Result<Value, Error> {
        self.skip_space();
        match self.peek() {
            None => Err(self.error(SyntaxKind::UnexpectedEnd, self.pos)),
            Some(b'{') => self.parse_object(),
            Some(b'[') => self.parse_array(),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_literal(b"true", Value::Boolean(true)),
            Some(b'f') => self.parse_literal(b"false", Value::Boolean(false)),
            Some(b'n') => self.parse_literal(b"null", Value::Null),
            Some(b'-' | b'0'..=b'9') => self.parse_number(),
            Some(_) => Err(self.error(SyntaxKind::UnexpectedToken, self.pos)),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    fn error(&self, kind: SyntaxKind, offset: usize) -> Error {
        log::trace!("{} at byte {offset}", kind.message());
        Error::syntax(kind, code_point_position(self.text, offset))
    }

    fn enter(&mut self) -> Result<(), Error> {
        if self.depth >= C::MAX_DEPTH {
            return Err(self.error(SyntaxKind::NestedTooDeep, self.pos));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_literal(&mut self, word: &[u8], value: Value) -> Result<Value, Error> {
        if !self.text[self.pos..].starts_with(word) {
            return Err(self.error(SyntaxKind::UnexpectedToken, self.pos));
        }
        self.pos += word.len();
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value, Error> {
        let (number, end) =
            scan_number(self.text, self.pos).map_err(|(kind, at)| self.error(kind, at))?;
        self.pos = end;
        Ok(Value::Number(number))
    }

    fn parse_object(&mut self) -> Result<Value, Error> {
        self.enter()?;
        let object = Object::new();
        let mut has_member = false;

        loop {
            // Step over `{` or `,`.
            self.pos += 1;
            self.skip_space();
            match self.peek() {
                None => return Err(self.error(SyntaxKind::UnexpectedEnd, self.pos)),
                Some(b'}') if has_member => {
                    return Err(self.error(SyntaxKind::TrailingComma, self.pos - 1))
                }
                Some(b'}') => break,
                Some(b'"') => {}
                Some(_) => return Err(self.error(SyntaxKind::UnexpectedToken, self.pos)),
            }

            let key = self.parse_string()?;
            self.skip_space();
            if self.peek() != Some(b':') {
                return Err(self.error(SyntaxKind::UnexpectedToken, self.pos));
            }
            self.pos += 1;
            self.skip_space();
            if self.peek().is_none() {
                return Err(self.error(SyntaxKind::UnexpectedEnd, self.pos));
            }

            let value = self.parse_value()?;
            // A repeated key keeps its first position and takes the last value.
            object.set(key, value);
            has_member = true;

            self.skip_space();
            match self.peek() {
                None => return Err(self.error(SyntaxKind::UnexpectedEnd, self.pos)),
                Some(b',') => {}
                Some(b'}') => break,
                Some(_) => return Err(self.error(SyntaxKind::UnexpectedToken, self.pos)),
            }
        }

        self.pos += 1;
        self.depth -= 1;
        Ok(Value::Object(object))
    }

    fn parse_array(&mut self) -> Result<Value, Error> {
        self.enter()?;
        let mut elements = Vec::new();

        loop {
            // Step over `[` or `,`.
            self.pos += 1;
            self.skip_space();
            match self.peek() {
                None => return Err(self.error(SyntaxKind::UnexpectedEnd, self.pos)),
                Some(b']') if !elements.is_empty() => {
                    return Err(self.error(SyntaxKind::TrailingComma, self.pos - 1))
                }
                Some(b']') => break,
                Some(_) => {}
            }

            elements.push(self.parse_value()?);

            self.skip_space();
            match self.peek() {
                None => return Err(self.error(SyntaxKind::UnexpectedEnd, self.pos)),
                Some(b',') => {}
                Some(b']') => break,
                Some(_) => return Err(self.error(SyntaxKind::UnexpectedToken, self.pos)),
            }
        }

        self.pos += 1;
        self.depth -= 1;
        Ok(Value::Array(Array::from_vec(elements)))
    }

    /// Parse a string literal; the current byte is the opening quote.
    ///
    /// Strings without escapes are taken straight from the input; the first
    /// escape switches to an owned copy.
    fn parse_string(&mut self) -> Result<JsString, Error> {
        let text = self.text;
        let start = self.pos + 1;
        let mut p = start;
        let mut run_start = start;
        let mut unescaped: Option<Vec<u8>> = None;

        loop {
            let Some(&byte) = text.get(p) else {
                return Err(self.error(SyntaxKind::UnexpectedEnd, text.len()));
            };
            match byte {
                b'"' => break,
                b'\\' => {
                    let out = unescaped.get_or_insert_with(Vec::new);
                    out.extend_from_slice(&text[run_start..p]);
                    p = self.unescape(p, out)?;
                    run_start = p;
                }
                _ if byte < 0x20 => {
                    return Err(self.error(SyntaxKind::ForbiddenSourceChar, p));
                }
                _ => p += 1,
            }
        }

        self.pos = p + 1;
        Ok(match unescaped {
            Some(mut out) => {
                out.extend_from_slice(&text[run_start..p]);
                JsString::from_vec(out)
            }
            None => JsString::from_bytes(&text[start..p]),
        })
    }

    /// Decode one escape sequence starting at the backslash at `p`.
    ///
    /// Returns the offset just past the sequence.
    fn unescape(&self, p: usize, out: &mut Vec<u8>) -> Result<usize, Error> {
        let text = self.text;
        let Some(&escape_char) = text.get(p + 1) else {
            return Err(self.error(SyntaxKind::UnexpectedEnd, text.len()));
        };
        if escape_char != b'u' {
            let byte = EscapeProcessor::process_simple_escape(escape_char)
                .map_err(|kind| self.error(kind, p + 1))?;
            out.push(byte);
            return Ok(p + 2);
        }

        let hex = |at: usize| {
            EscapeProcessor::decode_hex4(text, at).map_err(|(kind, offset)| self.error(kind, offset))
        };

        let mut code_unit = hex(p + 2)?;
        let mut q = p + 6;

        if EscapeProcessor::is_low_surrogate(code_unit) {
            return Err(self.error(SyntaxKind::InvalidUnicodeChar, q));
        }
        if EscapeProcessor::is_high_surrogate(code_unit) {
            match (text.get(q), text.get(q + 1)) {
                (None, _) => return Err(self.error(SyntaxKind::UnexpectedEnd, text.len())),
                (Some(b'\\'), Some(b'u')) => {}
                _ => return Err(self.error(SyntaxKind::InvalidUnicodeChar, q)),
            }
            let low = hex(q + 2)?;
            q += 6;
            code_unit = EscapeProcessor::combine_surrogate_pair(code_unit, low)
                .map_err(|kind| self.error(kind, q))?;
        }

        EscapeProcessor::push_utf8(out, code_unit).map_err(|kind| self.error(kind, q))?;
        Ok(q)
    }
}

/// Parse one value at byte offset `pos` of `text`.
///
/// Leading whitespace is skipped; trailing input is left for the caller.
/// Returns the value and the offset just past it.
pub fn parse_value(text: &[u8], pos: usize) -> Result<(Value, usize), Error> {
    let mut parser = Parser::new(text);
    parser.pos = pos.min(text.len());
    let value = parser.parse_value()?;
    Ok((value, parser.pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecLimits;

    fn parse(text: &str) -> Result<Value, Error> {
        Parser::new(text.as_bytes()).parse_document()
    }

    fn syntax_error(text: &str) -> (SyntaxKind, usize) {
        match parse(text) {
            Err(Error::Syntax { kind, position }) => (kind, position),
            other => panic!("Expected syntax error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse("true").unwrap(), Value::Boolean(true));
        assert_eq!(parse(" false ").unwrap(), Value::Boolean(false));
        assert_eq!(parse("null").unwrap(), Value::Null);
        assert_eq!(parse("-1.5e1").unwrap(), Value::Number(-15.0));
        assert_eq!(parse(r#""hi""#).unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_nested() {
        let value = parse(r#"{"a": [1, {"b": null}], "c": "d"}"#).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(
            object.own_enumerable_keys(),
            vec![JsString::from("a"), JsString::from("c")]
        );
        let inner = object.get_own("a").unwrap();
        assert_eq!(inner.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_keys() {
        let value = parse(r#"{"a":1,"b":0,"a":2}"#).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object.own_enumerable_keys()[0], JsString::from("a"));
        assert_eq!(object.get_own("a"), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_escapes() {
        let value = parse(r#""a\n\"\\\/\b\f\r\t\u0041é""#).unwrap();
        assert_eq!(value, Value::from("a\n\"\\/\u{8}\u{c}\r\tAé"));
    }

    #[test]
    fn test_surrogate_pair() {
        let value = parse(r#""\uD83D\uDE00""#).unwrap();
        let s = value.as_string().unwrap();
        assert_eq!(s.as_str(), Some("😀"));
        assert_eq!(s.length(), 1);
    }

    #[test]
    fn test_raw_utf8_copied() {
        let value = parse("\"héllo\"").unwrap();
        assert_eq!(value.as_string().unwrap().length(), 5);
    }

    #[test]
    fn test_errors() {
        assert_eq!(syntax_error(""), (SyntaxKind::UnexpectedEnd, 0));
        assert_eq!(syntax_error("  "), (SyntaxKind::UnexpectedEnd, 2));
        assert_eq!(syntax_error("[1,2,]"), (SyntaxKind::TrailingComma, 4));
        assert_eq!(syntax_error(r#"{"a":1,}"#), (SyntaxKind::TrailingComma, 6));
        assert_eq!(syntax_error("1 2"), (SyntaxKind::UnexpectedToken, 2));
        assert_eq!(syntax_error("{1:2}"), (SyntaxKind::UnexpectedToken, 1));
        assert_eq!(syntax_error(r#"{"a" 1}"#), (SyntaxKind::UnexpectedToken, 5));
        assert_eq!(syntax_error("[1"), (SyntaxKind::UnexpectedEnd, 2));
        assert_eq!(syntax_error("tru"), (SyntaxKind::UnexpectedToken, 0));
        assert_eq!(syntax_error("01"), (SyntaxKind::UnexpectedToken, 1));
        assert_eq!(syntax_error("-"), (SyntaxKind::UnexpectedNumber, 1));
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(syntax_error("\"a\u{1}\""), (SyntaxKind::ForbiddenSourceChar, 2));
        assert_eq!(syntax_error(r#""\x""#), (SyntaxKind::UnknownEscapeChar, 2));
        assert_eq!(syntax_error(r#""\u12G4""#), (SyntaxKind::InvalidUnicodeEscape, 5));
        assert_eq!(syntax_error(r#""\uDE00""#), (SyntaxKind::InvalidUnicodeChar, 7));
        assert_eq!(syntax_error(r#""\uD83Dx""#), (SyntaxKind::InvalidUnicodeChar, 7));
        assert_eq!(
            syntax_error(r#""\uD83D\u0041""#),
            (SyntaxKind::InvalidSurrogatePair, 13)
        );
        assert_eq!(syntax_error("\"abc"), (SyntaxKind::UnexpectedEnd, 4));
    }

    #[test]
    fn test_position_counts_code_points() {
        assert_eq!(syntax_error("[\"é\",]"), (SyntaxKind::TrailingComma, 4));
    }

    #[test]
    fn test_depth_limit() {
        let ok = format!("{}{}", "[".repeat(32), "]".repeat(32));
        assert!(parse(&ok).is_ok());
        let deep = format!("{}{}", "[".repeat(33), "]".repeat(33));
        assert_eq!(syntax_error(&deep), (SyntaxKind::NestedTooDeep, 32));
    }

    #[test]
    fn test_custom_depth() {
        let mut parser = Parser::<CodecLimits<2, 128, 10>>::with_config(b"[[[]]]");
        let err = parser.parse_document().unwrap_err();
        assert_eq!(err.syntax_kind(), Some(SyntaxKind::NestedTooDeep));
    }

    #[test]
    fn test_parse_value_at_offset() {
        let (value, end) = parse_value(b"xx [1] tail", 2).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(end, 6);
    }
}
