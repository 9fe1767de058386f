// SPDX-License-Identifier: Apache-2.0

use crate::chunk_buffer::ChunkBuffer;
use crate::error::{Error, SyntaxKind};

/// Escape handling shared by the parser (unescape-on-read) and the
/// stringify/dump writers (escape-on-write).
pub struct EscapeProcessor;

/// Longest escape sequence a single input byte expands to: `\u00XX`.
const MAX_ESCAPE_LEN: usize = 6;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

impl EscapeProcessor {
    /// Process a simple escape sequence character and return the unescaped byte.
    ///
    /// # Arguments
    /// * `escape_char` - The character following the backslash in an escape sequence
    ///
    /// # Returns
    /// The unescaped byte value, or `UnknownEscapeChar` for anything else
    /// (including `u`, which is handled by the caller).
    ///
    /// # Examples
    /// ```
    /// use hostjson::EscapeProcessor;
    /// assert_eq!(EscapeProcessor::process_simple_escape(b'n').unwrap(), b'\n');
    /// ```
    pub fn process_simple_escape(escape_char: u8) -> Result<u8, SyntaxKind> {
        match escape_char {
            b'n' => Ok(b'\n'),
            b't' => Ok(b'\t'),
            b'r' => Ok(b'\r'),
            b'\\' => Ok(b'\\'),
            b'"' => Ok(b'"'),
            b'/' => Ok(b'/'),
            b'b' => Ok(0x08), // Backspace
            b'f' => Ok(0x0C), // Form feed
            _ => Err(SyntaxKind::UnknownEscapeChar),
        }
    }

    /// Validate that a byte represents a valid hexadecimal digit.
    ///
    /// # Returns
    /// The numeric value (0-15) of the hex digit, or an error if invalid.
    pub fn validate_hex_digit(byte: u8) -> Result<u32, SyntaxKind> {
        match byte {
            b'0'..=b'9' => Ok((byte - b'0') as u32),
            b'a'..=b'f' => Ok(byte.wrapping_sub(b'a').wrapping_add(10) as u32),
            b'A'..=b'F' => Ok(byte.wrapping_sub(b'A').wrapping_add(10) as u32),
            _ => Err(SyntaxKind::InvalidUnicodeEscape),
        }
    }

    /// Decode the four hex digits of a `\uXXXX` escape starting at `start`.
    ///
    /// On failure returns the kind and the byte offset it applies to: the
    /// first bad digit, or the end of `text` when it is too short.
    pub fn decode_hex4(text: &[u8], start: usize) -> Result<u32, (SyntaxKind, usize)> {
        let mut code_unit = 0u32;
        for offset in start..start + 4 {
            let byte = *text
                .get(offset)
                .ok_or((SyntaxKind::UnexpectedEnd, text.len()))?;
            let digit = Self::validate_hex_digit(byte).map_err(|kind| (kind, offset))?;
            code_unit = (code_unit << 4) | digit;
        }
        Ok(code_unit)
    }

    /// Check if a UTF-16 code unit is a high surrogate (0xD800-0xDBFF)
    pub fn is_high_surrogate(code_unit: u32) -> bool {
        (0xD800..=0xDBFF).contains(&code_unit)
    }

    /// Check if a UTF-16 code unit is a low surrogate (0xDC00-0xDFFF)
    pub fn is_low_surrogate(code_unit: u32) -> bool {
        (0xDC00..=0xDFFF).contains(&code_unit)
    }

    /// Combine a high and low surrogate pair into a single Unicode codepoint
    pub fn combine_surrogate_pair(high: u32, low: u32) -> Result<u32, SyntaxKind> {
        if !Self::is_high_surrogate(high) || !Self::is_low_surrogate(low) {
            return Err(SyntaxKind::InvalidSurrogatePair);
        }
        Ok(0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF))
    }

    /// Append the UTF-8 encoding of `codepoint` to `out`.
    pub fn push_utf8(out: &mut Vec<u8>, codepoint: u32) -> Result<(), SyntaxKind> {
        let ch = char::from_u32(codepoint).ok_or(SyntaxKind::InvalidUnicodeChar)?;
        let mut utf8_buffer = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut utf8_buffer).as_bytes());
        Ok(())
    }

    /// Escape sequence for `byte`, if it needs one when quoted with `quote`.
    ///
    /// Returns the number of bytes written into `escaped`.
    pub fn escape_byte(byte: u8, quote: u8, escaped: &mut [u8; MAX_ESCAPE_LEN]) -> Option<usize> {
        let short = match byte {
            b'\\' => b'\\',
            b'\n' => b'n',
            b'\r' => b'r',
            b'\t' => b't',
            0x08 => b'b',
            0x0C => b'f',
            _ if byte == quote => quote,
            _ if byte < 0x20 => {
                *escaped = [
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX_UPPER[(byte >> 4) as usize],
                    HEX_UPPER[(byte & 0xF) as usize],
                ];
                return Some(MAX_ESCAPE_LEN);
            }
            _ => return None,
        };
        escaped[0] = b'\\';
        escaped[1] = short;
        Some(2)
    }

    /// Write `bytes` surrounded by `quote`, escaping as needed.
    ///
    /// Runs of bytes that need no escaping are copied verbatim; this covers
    /// multi-byte UTF-8 sequences and the raw bytes of byte strings alike.
    pub fn write_quoted(out: &mut ChunkBuffer, bytes: &[u8], quote: u8) -> Result<(), Error> {
        out.push(quote)?;
        Self::write_escaped(out, bytes, quote)?;
        out.push(quote)
    }

    /// Write `bytes` escaped for a `quote`-delimited literal, without the quotes.
    pub fn write_escaped(out: &mut ChunkBuffer, bytes: &[u8], quote: u8) -> Result<(), Error> {
        let mut escaped = [0u8; MAX_ESCAPE_LEN];
        let mut run_start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(len) = Self::escape_byte(byte, quote, &mut escaped) {
                out.append(&bytes[run_start..i])?;
                out.append(&escaped[..len])?;
                run_start = i + 1;
            }
        }
        out.append(&bytes[run_start..])
    }
}
