// SPDX-License-Identifier: Apache-2.0

//! Malformed documents in the spirit of the json.org JSON_checker suite.
//!
//! Each case names the input, the expected failure kind and, where the
//! offset is the point of the case, the code point position.

use hostjson::{parse, Error, NativeInvoker, SyntaxKind};

fn parse_error(input: &str) -> (SyntaxKind, usize) {
    match parse(input.as_bytes(), None, &mut NativeInvoker::new()) {
        Err(Error::Syntax { kind, position }) => (kind, position),
        other => panic!("expected a syntax error for {input:?}, got {other:?}"),
    }
}

macro_rules! fail_cases {
    ($($name:ident: $input:expr => $kind:ident $(@ $pos:expr)?;)*) => {
        $(
            paste::paste! {
                #[test_log::test]
                fn [<test_fail_ $name>]() {
                    let (kind, _position) = parse_error($input);
                    assert_eq!(kind, SyntaxKind::$kind, "input {:?}", $input);
                    $(assert_eq!(_position, $pos, "input {:?}", $input);)?
                }
            }
        )*
    };
}

fail_cases! {
    unclosed_array: r#"["Unclosed array""# => UnexpectedEnd @ 17;
    unquoted_key: r#"{unquoted_key: "keys must be quoted"}"# => UnexpectedToken @ 1;
    extra_comma: r#"["extra comma",]"# => TrailingComma @ 14;
    double_extra_comma: r#"["double extra comma",,]"# => UnexpectedToken @ 22;
    missing_value: r#"[   , "<-- missing value"]"# => UnexpectedToken @ 4;
    comma_after_close: r#"["Comma after the close"],"# => UnexpectedToken @ 25;
    extra_close: r#"["Extra close"]]"# => UnexpectedToken @ 15;
    object_extra_comma: r#"{"Extra comma": true,}"# => TrailingComma @ 20;
    value_after_close: r#"{"Extra value after close": true} "misplaced quoted value""# => UnexpectedToken;
    illegal_expression: r#"{"Illegal expression": 1 + 2}"# => UnexpectedToken;
    illegal_invocation: r#"{"Illegal invocation": alert()}"# => UnexpectedToken;
    leading_zero: r#"{"Numbers cannot have leading zeroes": 013}"# => UnexpectedToken;
    hex_number: r#"{"Numbers cannot be hex": 0x14}"# => UnexpectedToken;
    hex_escape: r#"["Illegal backslash escape: \x15"]"# => UnknownEscapeChar;
    naked_backslash: r#"[\naked]"# => UnexpectedToken @ 1;
    octal_escape: r#"["Illegal backslash escape: \017"]"# => UnknownEscapeChar;
    missing_colon: r#"{"Missing colon" null}"# => UnexpectedToken @ 17;
    double_colon: r#"{"Double colon":: null}"# => UnexpectedToken @ 16;
    comma_for_colon: r#"{"Comma instead of colon", null}"# => UnexpectedToken;
    colon_for_comma: r#"["Colon instead of comma": false]"# => UnexpectedToken;
    bad_literal: r#"["Bad value", truth]"# => UnexpectedToken;
    single_quote: "['single quote']" => UnexpectedToken @ 1;
    raw_tab: "[\"tab\tcharacter\"]" => ForbiddenSourceChar @ 5;
    escaped_space: r#"["tab\   character"]"# => UnknownEscapeChar;
    raw_newline: "[\"line\nbreak\"]" => ForbiddenSourceChar @ 6;
    escaped_newline: "[\"line\\\nbreak\"]" => UnknownEscapeChar;
    bare_exponent: "[0e]" => UnexpectedNumber @ 3;
    signed_bare_exponent: "[0e+]" => UnexpectedNumber @ 4;
    double_sign_exponent: "[0e+-1]" => UnexpectedNumber @ 4;
    missing_fraction: "[1.]" => UnexpectedNumber @ 3;
    lone_minus: "-" => UnexpectedNumber @ 1;
    unclosed_object: r#"{"Comment": false"# => UnexpectedEnd;
    mismatch: r#"["mismatch"}"# => UnexpectedToken @ 11;
    empty_document: "" => UnexpectedEnd @ 0;
    blank_document: " \t\r\n" => UnexpectedEnd @ 4;
    unterminated_string: "\"abc" => UnexpectedEnd @ 4;
    short_unicode: r#""\u12""# => InvalidUnicodeEscape;
    bad_hex: r#""\u12G4""# => InvalidUnicodeEscape;
    lone_low_surrogate: r#""\uDC00""# => InvalidUnicodeChar;
    unpaired_high_surrogate: r#""\uD800x""# => InvalidUnicodeChar;
    broken_pair: r#""\uD800\u0041""# => InvalidSurrogatePair;
}

#[test_log::test]
fn test_depth_limit_position() {
    let at_limit = "[".repeat(32) + &"]".repeat(32);
    assert!(parse(at_limit.as_bytes(), None, &mut NativeInvoker::new()).is_ok());

    let over = "[".repeat(33) + &"]".repeat(33);
    assert_eq!(parse_error(&over), (SyntaxKind::NestedTooDeep, 32));
}

#[test_log::test]
fn test_position_counts_code_points() {
    // Two-byte and four-byte characters each count once.
    assert_eq!(parse_error("[\"é😀\" x]"), (SyntaxKind::UnexpectedToken, 6));
}

#[test_log::test]
fn test_error_display() {
    let err = parse(b"[1,2,]", None, &mut NativeInvoker::new()).unwrap_err();
    assert_eq!(err.to_string(), "SyntaxError: Trailing comma at position 4");
}
