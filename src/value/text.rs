//! Text, enum and bytea codecs.

use bytes::BytesMut;

use super::{mismatch, utf8, Codec};
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::source::{Native, Source};
use crate::text::encode_hex_bytea;

/// Length rule of a text value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Text,
    /// Truncate past the limit (0 = unlimited).
    VarChar(usize),
    /// Blank-pad to exactly the limit; longer input fails.
    Char(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue {
    text_kind: TextKind,
    value: Option<String>,
}

impl TextValue {
    pub fn new(text_kind: TextKind) -> Self {
        Self { text_kind, value: None }
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn fit(&self, mut text: String) -> ValueResult<String> {
        match self.text_kind {
            TextKind::Text | TextKind::VarChar(0) => Ok(text),
            TextKind::VarChar(limit) => {
                if let Some((end, _)) = text.char_indices().nth(limit) {
                    text.truncate(end);
                }
                Ok(text)
            }
            TextKind::Char(limit) => {
                let trimmed = text.trim_end_matches(' ');
                if trimmed.chars().count() > limit {
                    return Err(ValueError::Length { value: text, limit });
                }
                Ok(format!("{trimmed:<limit$}"))
            }
        }
    }
}

impl Codec for TextValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Str(s) => Some(self.fit(s)?),
            Source::Bytes(b) => Some(self.fit(utf8(b, "text")?)?),
            other => return Err(mismatch(&self.kind(), &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(text) = &self.value {
            buf.extend_from_slice(text.as_bytes());
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        match self.text_kind {
            TextKind::Text => Kind::Text,
            TextKind::VarChar(length) => Kind::VarChar { length },
            TextKind::Char(length) => Kind::Char { length },
        }
    }

    fn to_native(&self) -> Native {
        self.value.clone().map_or(Native::Null, Native::Text)
    }
}

/// Text restricted to a fixed label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    labels: Vec<String>,
    value: Option<String>,
}

impl EnumValue {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels, value: None }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn check(&self, value: String) -> ValueResult<String> {
        if self.labels.contains(&value) {
            Ok(value)
        } else {
            Err(ValueError::InvalidEnumValue { value, labels: self.labels.clone() })
        }
    }
}

impl Codec for EnumValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Str(s) => Some(self.check(s)?),
            Source::Bytes(b) => Some(self.check(utf8(b, "enum")?)?),
            other => return Err(mismatch(&self.kind(), &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(text) = &self.value {
            buf.extend_from_slice(text.as_bytes());
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Enum { labels: self.labels.clone() }
    }

    fn to_native(&self) -> Native {
        self.value.clone().map_or(Native::Null, Native::Text)
    }
}

/// Binary payload, written in `\x` hex form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteaValue {
    value: Option<Vec<u8>>,
}

impl ByteaValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

impl Codec for ByteaValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Bytes(b) => Some(b),
            other => return Err(mismatch(&Kind::Bytea, &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(bytes) = &self.value {
            buf.extend_from_slice(&encode_hex_bytea(bytes));
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Bytea
    }

    fn to_native(&self) -> Native {
        self.value.clone().map_or(Native::Null, Native::Bytes)
    }
}
