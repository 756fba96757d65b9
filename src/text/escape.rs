//! Escaping dialects for quoted literal elements.
//!
//! PostgreSQL escapes quoted elements differently depending on where they
//! appear:
//! - `None`: bare (unquoted) elements, passed through untouched
//! - `Array`: `\` before `\` and `"` (array_out)
//! - `Row`: `\` before `\`, `"` doubled to `""` (record_out)
//!
//! Both directions borrow when there is nothing to rewrite.

use std::borrow::Cow;

use crate::error::{ValueError, ValueResult};

/// Hex-bytea marker prefix.
pub const HEX_MARKER: &[u8] = b"\\x";

/// Escaping convention of a quoted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    None,
    Array,
    Row,
}

/// Escape `input` for placement between double quotes.
///
/// The backslash pass runs before the quote pass so the backslashes the
/// array dialect introduces are not doubled again.
pub fn escape(input: &[u8], dialect: Dialect) -> Cow<'_, [u8]> {
    if dialect == Dialect::None {
        return Cow::Borrowed(input);
    }
    let out = replace(Cow::Borrowed(input), b'\\', b"\\\\");
    match dialect {
        Dialect::Array => replace(out, b'"', b"\\\""),
        Dialect::Row => replace(out, b'"', b"\"\""),
        Dialect::None => out,
    }
}

/// Reverse [`escape`].
///
/// Runs as one left-to-right pass: an escaped byte is emitted verbatim and
/// never looked at again.
pub fn unescape(input: &[u8], dialect: Dialect) -> Cow<'_, [u8]> {
    let needs_work = match dialect {
        Dialect::None => false,
        Dialect::Array => input.contains(&b'\\'),
        Dialect::Row => input.contains(&b'\\') || input.windows(2).any(|w| w == b"\"\""),
    };
    if !needs_work {
        return Cow::Borrowed(input);
    }

    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'\\' if i + 1 < input.len() => {
                out.push(input[i + 1]);
                i += 2;
            }
            b'"' if dialect == Dialect::Row && input.get(i + 1) == Some(&b'"') => {
                out.push(b'"');
                i += 2;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Cow::Owned(out)
}

/// Decode `\x`-prefixed hex text into raw bytes.
///
/// Returns `Ok(None)` when the marker is absent.
pub fn decode_hex_bytea(input: &[u8]) -> ValueResult<Option<Vec<u8>>> {
    match input.strip_prefix(HEX_MARKER) {
        Some(digits) => hex::decode(digits)
            .map(Some)
            .map_err(|e| ValueError::malformed(format!("invalid bytea: {e}"))),
        None => Ok(None),
    }
}

/// Render raw bytes as a `\x`-prefixed lowercase hex literal.
pub fn encode_hex_bytea(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEX_MARKER.len() + bytes.len() * 2);
    out.extend_from_slice(HEX_MARKER);
    out.extend_from_slice(hex::encode(bytes).as_bytes());
    out
}

fn replace<'a>(input: Cow<'a, [u8]>, needle: u8, with: &[u8]) -> Cow<'a, [u8]> {
    if !input.contains(&needle) {
        return input;
    }
    let mut out = Vec::with_capacity(input.len() + 8);
    for &b in input.iter() {
        if b == needle {
            out.extend_from_slice(with);
        } else {
            out.push(b);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_array() {
        assert_eq!(&*escape(br#"say "hi" \o/"#, Dialect::Array), br#"say \"hi\" \\o/"#);
    }

    #[test]
    fn test_escape_row() {
        assert_eq!(&*escape(br#"say "hi" \o/"#, Dialect::Row), br#"say ""hi"" \\o/"#);
    }

    #[test]
    fn test_escape_none_borrows() {
        let input = br#"a"b\c"#;
        assert!(matches!(escape(input, Dialect::None), Cow::Borrowed(_)));
        assert!(matches!(escape(b"plain", Dialect::Array), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape_array() {
        assert_eq!(&*unescape(br#"jeff \"the\" bob"#, Dialect::Array), br#"jeff "the" bob"#);
        assert_eq!(&*unescape(br#"c:\\dir"#, Dialect::Array), br#"c:\dir"#);
    }

    #[test]
    fn test_unescape_row_accepts_both_quote_styles() {
        assert_eq!(&*unescape(br#"jeff ""the"" bob"#, Dialect::Row), br#"jeff "the" bob"#);
        assert_eq!(&*unescape(br#"jeff \"the\" bob"#, Dialect::Row), br#"jeff "the" bob"#);
    }

    #[test]
    fn test_unescape_does_not_reinterpret() {
        // escaped backslash, then escaped quote
        assert_eq!(&*unescape(br#"\\\""#, Dialect::Array), br#"\""#);
        assert_eq!(&*unescape(br#"\\"""#, Dialect::Row), br#"\""#);
    }

    #[test]
    fn test_hex_bytea() {
        assert_eq!(decode_hex_bytea(b"\\x48656c6c6f").unwrap(), Some(b"Hello".to_vec()));
        assert_eq!(decode_hex_bytea(b"Hello").unwrap(), None);
        assert!(decode_hex_bytea(b"\\x123").is_err());
        assert_eq!(encode_hex_bytea(&[0xde, 0xad]), b"\\xdead".to_vec());
    }
}
