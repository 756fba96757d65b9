//! Dynamic value tree (Layer 2: kinds and codecs)
//!
//! [`Value`] has one variant per kind. Scalar variants own their decode and
//! encode logic; container variants compose children through the splitter
//! and recurse back into [`Value::new`] for each element.
//!
//! # Example
//! ```
//! use pgvalue::{Kind, Value};
//!
//! let mut v = Value::new(&Kind::array(Kind::Text));
//! v.decode(r#"{"a b",NULL,c}"#).unwrap();
//! assert_eq!(v.values().len(), 3);
//! assert!(v.value_at(1).unwrap().is_null());
//! assert_eq!(v.to_string(), r#"{"a b",NULL,"c"}"#);
//! ```

mod array;
mod hstore;
mod numeric;
mod record;
mod text;
mod timestamp;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bytes::BytesMut;
use chrono::{DateTime, FixedOffset};

pub use array::ArrayValue;
pub use hstore::HStoreValue;
pub use numeric::{BoolValue, FloatValue, IntegerValue, NumericValue};
pub use record::{RecordValue, RowValue};
pub use text::{ByteaValue, EnumValue, TextKind, TextValue};
pub use timestamp::{parse_timestamp, TimestampValue};

use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::source::{Native, Source};
use crate::text::NULL_TOKEN;

/// Decode/encode contract every kind implements.
pub trait Codec {
    /// Populate from `src`; `Source::Null` makes the value NULL.
    fn decode(&mut self, src: Source) -> ValueResult<()>;

    /// Write the literal form. Only called on non-NULL values.
    fn encode_into(&self, buf: &mut BytesMut);

    fn is_null(&self) -> bool;

    /// Descriptor this value was built from.
    fn kind(&self) -> Kind;

    /// Native payload. Only called on non-NULL values.
    fn to_native(&self) -> Native;
}

/// A PostgreSQL value of any kind, possibly NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(IntegerValue),
    Numeric(NumericValue),
    Float(FloatValue),
    Bool(BoolValue),
    Text(TextValue),
    Enum(EnumValue),
    Bytea(ByteaValue),
    Timestamp(TimestampValue),
    Array(ArrayValue),
    Row(RowValue),
    Record(RecordValue),
    HStore(HStoreValue),
}

macro_rules! dispatch {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            Value::Integer($v) => $body,
            Value::Numeric($v) => $body,
            Value::Float($v) => $body,
            Value::Bool($v) => $body,
            Value::Text($v) => $body,
            Value::Enum($v) => $body,
            Value::Bytea($v) => $body,
            Value::Timestamp($v) => $body,
            Value::Array($v) => $body,
            Value::Row($v) => $body,
            Value::Record($v) => $body,
            Value::HStore($v) => $body,
        }
    };
}

impl Value {
    /// Build a blank (NULL) value of `kind`.
    pub fn new(kind: &Kind) -> Self {
        match kind {
            Kind::Integer { width } => Value::Integer(IntegerValue::new(*width)),
            Kind::Numeric { precision, scale } => {
                Value::Numeric(NumericValue::new(*precision, *scale))
            }
            Kind::Float { width } => Value::Float(FloatValue::new(*width)),
            Kind::Bool => Value::Bool(BoolValue::new()),
            Kind::Text => Value::Text(TextValue::new(TextKind::Text)),
            Kind::VarChar { length } => Value::Text(TextValue::new(TextKind::VarChar(*length))),
            Kind::Char { length } => Value::Text(TextValue::new(TextKind::Char(*length))),
            Kind::Bytea => Value::Bytea(ByteaValue::new()),
            Kind::Timestamp => Value::Timestamp(TimestampValue::new()),
            Kind::Enum { labels } => Value::Enum(EnumValue::new(labels.clone())),
            Kind::Array { element } => Value::Array(ArrayValue::new(element.as_ref().clone())),
            Kind::Row { slots } => Value::Row(RowValue::new(slots)),
            Kind::Record { columns } => Value::Record(RecordValue::new(Arc::clone(columns))),
            Kind::HStore => Value::HStore(HStoreValue::new()),
        }
    }

    /// Populate this value from raw bytes, a native primitive, a list, a
    /// map, or a pre-built value of the same kind.
    pub fn decode(&mut self, src: impl Into<Source>) -> ValueResult<()> {
        match src.into() {
            Source::Value(other) => {
                if other.kind() != self.kind() {
                    return Err(mismatch(&self.kind(), &Source::Value(other)));
                }
                *self = other;
                Ok(())
            }
            src => dispatch!(self, v => v.decode(src)),
        }
    }

    pub fn is_null(&self) -> bool {
        dispatch!(self, v => v.is_null())
    }

    pub fn kind(&self) -> Kind {
        dispatch!(self, v => v.kind())
    }

    /// PostgreSQL literal bytes; `NULL` for a NULL value.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf
    }

    pub fn encode_into(&self, buf: &mut BytesMut) {
        if self.is_null() {
            buf.extend_from_slice(NULL_TOKEN);
        } else {
            dispatch!(self, v => v.encode_into(buf))
        }
    }

    /// Text-format bind parameter: `None` for NULL.
    pub fn to_param(&self) -> Option<Vec<u8>> {
        (!self.is_null()).then(|| self.encode().to_vec())
    }

    pub fn to_native(&self) -> Native {
        if self.is_null() {
            Native::Null
        } else {
            dispatch!(self, v => v.to_native())
        }
    }

    /// Written without quotes inside a row literal.
    pub(crate) fn bare_in_row(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::Numeric(_) | Value::Float(_) | Value::Bool(_)
        )
    }

    /// Written without quotes inside an array literal.
    pub(crate) fn bare_in_array(&self) -> bool {
        self.bare_in_row() || matches!(self, Value::Array(_) | Value::Timestamp(_))
    }

    // ==================== Ordered access ====================

    /// Children of an array, row or record; empty for everything else.
    pub fn values(&self) -> &[Value] {
        match self {
            Value::Array(a) => a.values(),
            Value::Row(r) => r.values(),
            Value::Record(r) => r.values(),
            _ => &[],
        }
    }

    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values().get(idx)
    }

    pub fn value_at_mut(&mut self, idx: usize) -> Option<&mut Value> {
        match self {
            Value::Array(a) => a.value_at_mut(idx),
            Value::Row(r) => r.value_at_mut(idx),
            Value::Record(r) => r.value_at_mut(idx),
            _ => None,
        }
    }

    /// Append to an array. Rows and records are fixed length.
    pub fn append(&mut self, src: impl Into<Source>) -> ValueResult<()> {
        match self {
            Value::Array(a) => a.append(src),
            Value::Row(r) => Err(ValueError::Arity { expected: r.len(), found: r.len() + 1 }),
            Value::Record(r) => Err(ValueError::Arity { expected: r.len(), found: r.len() + 1 }),
            other => {
                let src = src.into();
                Err(mismatch(&other.kind(), &src))
            }
        }
    }

    // ==================== Named access ====================

    /// Child by record column name or hstore key.
    pub fn value_by(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(r) => r.value_by(name),
            Value::HStore(h) => h.value_by(name),
            _ => None,
        }
    }

    pub fn value_by_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Record(r) => r.value_by_mut(name),
            Value::HStore(h) => h.value_by_mut(name),
            _ => None,
        }
    }

    /// Native payload of a named child.
    ///
    /// # Panics
    /// If `name` is not a column (or key) of this value. Asking for a name
    /// the schema does not have is a programming error.
    pub fn get(&self, name: &str) -> Native {
        match self.value_by(name) {
            Some(v) => v.to_native(),
            None => panic!("no column {name} in {}", self.kind()),
        }
    }

    /// Decode `src` into a named child. Records return `NotFound` for an
    /// unknown column; hstores insert the key.
    pub fn set(&mut self, name: &str, src: impl Into<Source>) -> ValueResult<()> {
        match self {
            Value::Record(r) => r.set(name, src),
            Value::HStore(h) => h.set(name, src),
            other => {
                let src = src.into();
                Err(mismatch(&other.kind(), &src))
            }
        }
    }

    /// Children by name, for records and hstores.
    pub fn map(&self) -> Option<BTreeMap<&str, &Value>> {
        match self {
            Value::Record(r) => Some(r.map()),
            Value::HStore(h) => Some(h.map()),
            _ => None,
        }
    }

    // ==================== Typed accessors ====================

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => v.get(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => v.get(),
            Value::Integer(v) => v.get().map(|n| n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => v.get(),
            _ => None,
        }
    }

    /// Text of text, enum and numeric values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => v.get(),
            Value::Enum(v) => v.get(),
            Value::Numeric(v) => v.get(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytea(v) => v.get(),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::Timestamp(v) => v.get(),
            _ => None,
        }
    }
}

/// Empty for NULL, plain text for scalars, literal text for containers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            v if v.is_null() => Ok(()),
            Value::Bytea(v) => f.write_str(&String::from_utf8_lossy(v.get().unwrap_or_default())),
            v => f.write_str(&String::from_utf8_lossy(&v.encode())),
        }
    }
}

pub(crate) fn mismatch(target: &Kind, src: &Source) -> ValueError {
    ValueError::TypeMismatch { target: target.type_name(), found: src.type_name() }
}

pub(crate) fn utf8(bytes: Vec<u8>, target: &'static str) -> ValueResult<String> {
    String::from_utf8(bytes).map_err(|e| ValueError::parse(e.as_bytes(), target))
}
