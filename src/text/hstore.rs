//! hstore text format: `"key"=>"value", "other"=>NULL`.
//!
//! Keys and values are always double-quoted and backslash-escaped; the
//! only bare token is `NULL` in value position.

use super::escape::{escape, unescape, Dialect};
use super::split::NULL_TOKEN;
use crate::error::{ValueError, ValueResult};

/// Scanner position within one `"key" => "value"` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingKey,
    InKey,
    AwaitingValue { arrow: bool },
    InValue,
}

/// Parse hstore text into ordered `(key, value)` pairs.
///
/// NULL values come back as `None`; dropping or keeping them is the
/// caller's decision.
///
/// # Example
/// ```
/// use pgvalue::text::parse_hstore;
///
/// let pairs = parse_hstore(br#""a"=>"1", "b"=>NULL"#).unwrap();
/// assert_eq!(pairs[0], ("a".to_string(), Some("1".to_string())));
/// assert_eq!(pairs[1], ("b".to_string(), None));
/// ```
pub fn parse_hstore(input: &[u8]) -> ValueResult<Vec<(String, Option<String>)>> {
    let mut pairs = Vec::new();
    let mut state = State::AwaitingKey;
    let mut key_start = 0;
    let mut key: Option<String> = None;
    let mut value_start = 0;

    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        match state {
            State::AwaitingKey => match b {
                b'"' => {
                    key_start = i + 1;
                    state = State::InKey;
                }
                b',' => {}
                b if b.is_ascii_whitespace() => {}
                _ => return Err(stray(b, i)),
            },
            State::InKey => match b {
                b'\\' => i += 1,
                b'"' => {
                    key = Some(span_text(&input[key_start..i])?);
                    state = State::AwaitingValue { arrow: false };
                }
                _ => {}
            },
            State::AwaitingValue { arrow: false } => match b {
                b'=' if input.get(i + 1) == Some(&b'>') => {
                    i += 1;
                    state = State::AwaitingValue { arrow: true };
                }
                b if b.is_ascii_whitespace() => {}
                _ => return Err(ValueError::malformed(format!("missing '=>' at byte {i}"))),
            },
            State::AwaitingValue { arrow: true } => match b {
                b'"' => {
                    value_start = i + 1;
                    state = State::InValue;
                }
                b'N' if input[i..].starts_with(NULL_TOKEN) => {
                    pairs.push((take_key(&mut key)?, None));
                    i += NULL_TOKEN.len() - 1;
                    state = State::AwaitingKey;
                }
                b if b.is_ascii_whitespace() => {}
                _ => return Err(stray(b, i)),
            },
            State::InValue => match b {
                b'\\' => i += 1,
                b'"' => {
                    let value = span_text(&input[value_start..i])?;
                    pairs.push((take_key(&mut key)?, Some(value)));
                    state = State::AwaitingKey;
                }
                _ => {}
            },
        }
        i += 1;
    }

    match state {
        State::AwaitingKey => Ok(pairs),
        State::InKey | State::InValue => Err(ValueError::malformed("unterminated hstore string")),
        State::AwaitingValue { .. } => Err(ValueError::malformed("hstore key without value")),
    }
}

/// Write pairs as hstore text.
pub fn write_hstore<'a, I>(pairs: I) -> Vec<u8>
where
    I: IntoIterator<Item = (&'a str, Option<&'a [u8]>)>,
{
    let mut out = Vec::new();
    for (n, (key, value)) in pairs.into_iter().enumerate() {
        if n > 0 {
            out.extend_from_slice(b", ");
        }
        out.push(b'"');
        out.extend_from_slice(&escape(key.as_bytes(), Dialect::Array));
        out.extend_from_slice(b"\"=>");
        match value {
            Some(v) => {
                out.push(b'"');
                out.extend_from_slice(&escape(v, Dialect::Array));
                out.push(b'"');
            }
            None => out.extend_from_slice(NULL_TOKEN),
        }
    }
    out
}

fn span_text(span: &[u8]) -> ValueResult<String> {
    String::from_utf8(unescape(span, Dialect::Array).into_owned())
        .map_err(|e| ValueError::malformed(format!("hstore text is not UTF-8: {e}")))
}

fn take_key(key: &mut Option<String>) -> ValueResult<String> {
    key.take().ok_or_else(|| ValueError::malformed("hstore value without key"))
}

fn stray(b: u8, at: usize) -> ValueError {
    ValueError::malformed(format!("unexpected '{}' at byte {at} in hstore", b as char))
}
