//! Splitter for array `{...}` and row `(...)` literals.
//!
//! Turns one outer literal into its ordered element parts. Quoted elements
//! come back unescaped for their context; nested arrays come back verbatim
//! so the caller can recurse into them with their own escaping intact.
//!
//! Whitespace around array elements is insignificant. Row elements keep it,
//! as `record_in` does: `( a,b)` splits into `" a"` and `"b"`. Whitespace
//! before a quoted row element is rejected; after one it is skipped.
//!
//! Arrays nest at most [`MAX_DIMENSIONS`] deep, so every byte of a literal
//! is scanned a bounded number of times.

use std::borrow::Cow;

use super::escape::{decode_hex_bytea, unescape, Dialect};
use crate::error::{ValueError, ValueResult};

/// Bare token PostgreSQL writes for a NULL element.
pub const NULL_TOKEN: &[u8] = b"NULL";

/// Most dimensions PostgreSQL allows in one array (`MAXDIM`).
pub const MAX_DIMENSIONS: usize = 6;

/// Which container a literal describes, fixed by its opening byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `{...}`
    Array,
    /// `(...)`
    Row,
}

impl Mode {
    /// Detect the mode from the first byte of a literal.
    pub fn detect(literal: &[u8]) -> ValueResult<Self> {
        match literal.first() {
            Some(b'{') => Ok(Mode::Array),
            Some(b'(') => Ok(Mode::Row),
            _ => Err(ValueError::malformed(format!(
                "unknown format: {}",
                String::from_utf8_lossy(literal)
            ))),
        }
    }

    pub fn open(self) -> u8 {
        match self {
            Mode::Array => b'{',
            Mode::Row => b'(',
        }
    }

    pub fn close(self) -> u8 {
        match self {
            Mode::Array => b'}',
            Mode::Row => b')',
        }
    }

    /// Escaping used by quoted elements in this container.
    pub fn dialect(self) -> Dialect {
        match self {
            Mode::Array => Dialect::Array,
            Mode::Row => Dialect::Row,
        }
    }
}

/// One element of a split literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part<'a> {
    /// `NULL` token, or an empty row element.
    Null,
    /// Unescaped element text.
    Text(Cow<'a, [u8]>),
    /// Hex-bytea element, already decoded.
    Bytes(Vec<u8>),
    /// Nested `{...}` array literal, still escaped.
    Nested(&'a [u8]),
}

impl Part<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Part::Null)
    }

    /// Raw bytes of the part (empty for NULL).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Part::Null => &[],
            Part::Text(t) => t,
            Part::Bytes(b) => b,
            Part::Nested(n) => n,
        }
    }
}

/// Split one array or row literal into its element parts.
///
/// # Example
/// ```
/// use pgvalue::text::split;
///
/// let parts = split(br#"{1,"two",NULL}"#).unwrap();
/// assert_eq!(parts.len(), 3);
/// assert_eq!(parts[1].as_bytes(), b"two");
/// assert!(parts[2].is_null());
/// ```
pub fn split(literal: &[u8]) -> ValueResult<Vec<Part<'_>>> {
    let mode = Mode::detect(literal)?;
    if literal.len() < 2 || literal[literal.len() - 1] != mode.close() {
        return Err(ValueError::malformed(format!(
            "missing '{}': {}",
            mode.close() as char,
            String::from_utf8_lossy(literal)
        )));
    }

    let body = &literal[1..literal.len() - 1];
    let mut parts = Vec::new();
    let empty = match mode {
        Mode::Array => body.iter().all(u8::is_ascii_whitespace),
        Mode::Row => body.is_empty(),
    };
    if empty {
        return Ok(parts);
    }

    let mut pos = 0;
    loop {
        if mode == Mode::Array {
            pos = skip_whitespace(body, pos);
        }
        let (part, end) = match body.get(pos) {
            None | Some(b',') => (empty_element(mode)?, pos),
            Some(b'"') => scan_quoted(body, pos, mode)?,
            Some(b'{') if mode == Mode::Array => scan_nested(body, pos)?,
            Some(_) => scan_bare(body, pos, mode)?,
        };
        parts.push(part);

        pos = skip_whitespace(body, end);
        match body.get(pos) {
            None => break,
            Some(b',') => pos += 1,
            Some(&b) => {
                return Err(ValueError::malformed(format!(
                    "unexpected '{}' after element {}",
                    b as char,
                    parts.len()
                )));
            }
        }
    }

    tracing::trace!(?mode, parts = parts.len(), "split literal");
    Ok(parts)
}

fn skip_whitespace(body: &[u8], mut pos: usize) -> usize {
    while body.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn empty_element(mode: Mode) -> ValueResult<Part<'static>> {
    match mode {
        Mode::Row => Ok(Part::Null),
        Mode::Array => Err(ValueError::malformed("empty array element")),
    }
}

/// Scan a `"..."` element starting at `start`; returns the part and the
/// index just past the closing quote.
fn scan_quoted(body: &[u8], start: usize, mode: Mode) -> ValueResult<(Part<'_>, usize)> {
    let mut i = start + 1;
    loop {
        match body.get(i) {
            None => return Err(ValueError::malformed("unterminated quoted element")),
            Some(b'\\') => i += 2,
            Some(b'"') if mode == Mode::Row && body.get(i + 1) == Some(&b'"') => i += 2,
            Some(b'"') => break,
            Some(_) => i += 1,
        }
    }

    let text = unescape(&body[start + 1..i], mode.dialect());
    let part = match decode_hex_bytea(&text) {
        Ok(Some(bytes)) => Part::Bytes(bytes),
        // `\x` followed by non-hex is ordinary text
        Ok(None) | Err(_) => Part::Text(text),
    };
    Ok((part, i + 1))
}

/// Scan a nested `{...}` element, tracking depth and skipping over quoted
/// strings so braces inside them do not count. The enclosing literal is the
/// first dimension.
fn scan_nested(body: &[u8], start: usize) -> ValueResult<(Part<'_>, usize)> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut i = start;
    while let Some(&b) = body.get(i) {
        if in_quote {
            match b {
                b'\\' => i += 1,
                b'"' => in_quote = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_quote = true,
                b'{' => {
                    depth += 1;
                    if depth >= MAX_DIMENSIONS {
                        return Err(ValueError::malformed(format!(
                            "array nested deeper than {MAX_DIMENSIONS} dimensions"
                        )));
                    }
                }
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((Part::Nested(&body[start..=i]), i + 1));
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    Err(ValueError::malformed("unbalanced braces in nested array"))
}

/// Scan an unquoted element up to the next comma.
fn scan_bare(body: &[u8], start: usize, mode: Mode) -> ValueResult<(Part<'_>, usize)> {
    let end = body[start..]
        .iter()
        .position(|&b| b == b',')
        .map_or(body.len(), |n| start + n);

    let mut raw = &body[start..end];
    if mode == Mode::Array {
        while raw.last().is_some_and(u8::is_ascii_whitespace) {
            raw = &raw[..raw.len() - 1];
        }
    }
    let stray = |b: u8| match mode {
        Mode::Array => matches!(b, b'"' | b'{' | b'}'),
        Mode::Row => matches!(b, b'"' | b'(' | b')'),
    };
    if let Some(&b) = raw.iter().find(|&&b| stray(b)) {
        return Err(ValueError::malformed(format!(
            "unexpected '{}' in unquoted {:?} element",
            b as char, mode
        )));
    }

    let part = if raw == NULL_TOKEN {
        Part::Null
    } else {
        Part::Text(Cow::Borrowed(raw))
    };
    Ok((part, end))
}
