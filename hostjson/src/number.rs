// SPDX-License-Identifier: Apache-2.0

//! Number literal recognition and Number-to-String formatting.

use crate::error::SyntaxKind;

fn digits_end(text: &[u8], mut pos: usize) -> usize {
    while text.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    pos
}

/// Recognize a number literal starting at `pos` and convert it to the
/// nearest `f64`.
///
/// Grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`. The
/// literal ends at the first byte that cannot extend it, so `01` yields `0`
/// and leaves `1` for the caller.
///
/// Returns the value and the offset just past the literal, or the failure
/// kind and the offset it applies to.
pub fn scan_number(text: &[u8], pos: usize) -> Result<(f64, usize), (SyntaxKind, usize)> {
    let mut p = pos;
    if text.get(p) == Some(&b'-') {
        p += 1;
    }

    match text.get(p) {
        Some(b'0') => p += 1,
        Some(b'1'..=b'9') => p = digits_end(text, p),
        _ => return Err((SyntaxKind::UnexpectedNumber, p)),
    }

    if text.get(p) == Some(&b'.') {
        let end = digits_end(text, p + 1);
        if end == p + 1 {
            return Err((SyntaxKind::UnexpectedNumber, end));
        }
        p = end;
    }

    if matches!(text.get(p), Some(b'e' | b'E')) {
        let mut q = p + 1;
        if matches!(text.get(q), Some(b'+' | b'-')) {
            q += 1;
        }
        let end = digits_end(text, q);
        if end == q {
            return Err((SyntaxKind::UnexpectedNumber, end));
        }
        p = end;
    }

    let value = core::str::from_utf8(&text[pos..p])
        .ok()
        .and_then(|literal| literal.parse::<f64>().ok())
        .ok_or((SyntaxKind::UnexpectedNumber, pos))?;
    Ok((value, p))
}

/// Render a number the way the scripting language's `String(n)` does.
///
/// Integral values below 1e21 are written positionally; otherwise the
/// shortest round-trip digits are placed positionally for decimal exponents
/// in `[-7, 21)` and in `d.ddde±x` form outside it.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-Infinity" } else { "Infinity" }.into();
    }
    if value == 0.0 {
        return "0".into();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e-7`.
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return format!("{sign}{scientific}"),
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the digit string.
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        let mut s = digits;
        s.push_str(&"0".repeat((n - k) as usize));
        s
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        let zeros = "0".repeat((-n) as usize);
        format!("0.{zeros}{digits}")
    } else {
        let e = n - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{e_sign}{}", e.abs())
        } else {
            format!("{first}.{rest}e{e_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}
