//! Native primitives flowing into and out of values.
//!
//! [`Source`] is everything a decode accepts: raw wire bytes, native
//! primitives, lists, string maps and pre-built values. [`Native`] is what
//! [`Value::to_native`](crate::Value::to_native) hands back.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::text::Part;
use crate::value::Value;

/// Input to [`Value::decode`](crate::Value::decode).
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Native text.
    Str(String),
    /// Raw bytes: a wire value, a split part, or bytea payload.
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    /// Ordered children for arrays, rows and records.
    List(Vec<Source>),
    /// String map for hstore.
    Map(BTreeMap<String, Option<String>>),
    /// A pre-built value, appended as is.
    Value(Value),
}

impl Source {
    /// Build a list source from anything convertible.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Source>,
    {
        Source::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the primitive, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Source::Null => "null",
            Source::Bool(_) => "bool",
            Source::Int(_) => "signed integer",
            Source::UInt(_) => "unsigned integer",
            Source::Float(_) => "float",
            Source::Str(_) => "string",
            Source::Bytes(_) => "bytes",
            Source::Timestamp(_) => "timestamp",
            Source::List(_) => "list",
            Source::Map(_) => "map",
            Source::Value(_) => "value",
        }
    }
}

macro_rules! source_from {
    ($variant:ident <- $($t:ty),+) => {
        $(
            impl From<$t> for Source {
                fn from(v: $t) -> Self {
                    Source::$variant(v.into())
                }
            }
        )+
    };
}

source_from!(Int <- i8, i16, i32, i64);
source_from!(UInt <- u8, u16, u32, u64);
source_from!(Float <- f32, f64);
source_from!(Bool <- bool);
source_from!(Str <- &str, String);
source_from!(Bytes <- &[u8], Vec<u8>);
source_from!(Timestamp <- DateTime<FixedOffset>);
source_from!(List <- Vec<Source>);
source_from!(Value <- Value);

impl From<isize> for Source {
    fn from(v: isize) -> Self {
        Source::Int(v as i64)
    }
}

impl From<usize> for Source {
    fn from(v: usize) -> Self {
        Source::UInt(v as u64)
    }
}

impl From<DateTime<Utc>> for Source {
    fn from(v: DateTime<Utc>) -> Self {
        Source::Timestamp(v.fixed_offset())
    }
}

/// Zone-less date-times are taken as UTC.
impl From<NaiveDateTime> for Source {
    fn from(v: NaiveDateTime) -> Self {
        Source::Timestamp(v.and_utc().fixed_offset())
    }
}

impl From<NaiveDate> for Source {
    fn from(v: NaiveDate) -> Self {
        Source::from(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Source>> From<Option<T>> for Source {
    fn from(v: Option<T>) -> Self {
        v.map_or(Source::Null, Into::into)
    }
}

impl From<BTreeMap<String, Option<String>>> for Source {
    fn from(v: BTreeMap<String, Option<String>>) -> Self {
        Source::Map(v)
    }
}

impl From<BTreeMap<String, String>> for Source {
    fn from(v: BTreeMap<String, String>) -> Self {
        Source::Map(v.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

impl From<HashMap<String, String>> for Source {
    fn from(v: HashMap<String, String>) -> Self {
        Source::Map(v.into_iter().map(|(k, v)| (k, Some(v))).collect())
    }
}

/// Split parts decode as raw bytes; nested literals recurse.
impl From<Part<'_>> for Source {
    fn from(part: Part<'_>) -> Self {
        match part {
            Part::Null => Source::Null,
            Part::Text(text) => Source::Bytes(text.into_owned()),
            Part::Bytes(bytes) => Source::Bytes(bytes),
            Part::Nested(literal) => Source::Bytes(literal.to_vec()),
        }
    }
}

/// Native payload of a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Native {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Numeric text, kept verbatim.
    Numeric(String),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<FixedOffset>),
    List(Vec<Native>),
    Map(BTreeMap<String, Native>),
}

impl Native {
    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }
}

impl From<Native> for Source {
    fn from(native: Native) -> Self {
        match native {
            Native::Null => Source::Null,
            Native::Bool(b) => Source::Bool(b),
            Native::Int(n) => Source::Int(n),
            Native::Float(n) => Source::Float(n),
            Native::Numeric(s) | Native::Text(s) => Source::Str(s),
            Native::Bytes(b) => Source::Bytes(b),
            Native::Timestamp(t) => Source::Timestamp(t),
            Native::List(items) => Source::list(items),
            Native::Map(map) => Source::Map(
                map.into_iter()
                    .map(|(k, v)| match v {
                        Native::Text(s) | Native::Numeric(s) => (k, Some(s)),
                        _ => (k, None),
                    })
                    .collect(),
            ),
        }
    }
}
