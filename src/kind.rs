//! Value kind descriptors.
//!
//! A [`Kind`] is the small configuration record a schema collaborator hands
//! over once per column: which codec, with which parameters. [`Value::new`]
//! is the single factory that turns it into a blank value.
//!
//! Kinds deserialize from schema files:
//!
//! ```
//! use pgvalue::Kind;
//!
//! let kind: Kind = serde_json::from_str(
//!     r#"{ "type": "array", "element": { "type": "varchar", "length": 20 } }"#,
//! ).unwrap();
//! assert_eq!(kind, Kind::array(Kind::varchar(20)));
//! assert_eq!(kind.type_name(), "varchar(20)[]");
//! ```
//!
//! [`Value::new`]: crate::Value::new

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValueResult;
use crate::schema::Column;
use crate::source::Source;
use crate::value::Value;

/// Bit width of an integer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IntWidth {
    /// `smallint` / `int2`
    Int2,
    /// `integer` / `int4`
    #[default]
    Int4,
    /// `bigint` / `int8`
    Int8,
}

impl IntWidth {
    pub fn bits(self) -> u8 {
        match self {
            IntWidth::Int2 => 16,
            IntWidth::Int4 => 32,
            IntWidth::Int8 => 64,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            IntWidth::Int2 => "int2",
            IntWidth::Int4 => "int4",
            IntWidth::Int8 => "int8",
        }
    }
}

impl TryFrom<u8> for IntWidth {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            16 => Ok(IntWidth::Int2),
            32 => Ok(IntWidth::Int4),
            64 => Ok(IntWidth::Int8),
            _ => Err(format!("invalid integer width {bits}, expected 16, 32 or 64")),
        }
    }
}

impl From<IntWidth> for u8 {
    fn from(width: IntWidth) -> u8 {
        width.bits()
    }
}

/// Bit width of a floating point kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FloatWidth {
    /// `real` / `float4`
    Real,
    /// `double precision` / `float8`
    #[default]
    Double,
}

impl FloatWidth {
    pub fn bits(self) -> u8 {
        match self {
            FloatWidth::Real => 32,
            FloatWidth::Double => 64,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            FloatWidth::Real => "float4",
            FloatWidth::Double => "float8",
        }
    }
}

impl TryFrom<u8> for FloatWidth {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            32 => Ok(FloatWidth::Real),
            64 => Ok(FloatWidth::Double),
            _ => Err(format!("invalid float width {bits}, expected 32 or 64")),
        }
    }
}

impl From<FloatWidth> for u8 {
    fn from(width: FloatWidth) -> u8 {
        width.bits()
    }
}

/// The codec identity of a value, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kind {
    Integer {
        #[serde(default)]
        width: IntWidth,
    },
    /// Arbitrary precision, stored as text.
    Numeric {
        #[serde(default)]
        precision: u32,
        #[serde(default)]
        scale: u32,
    },
    Float {
        #[serde(default)]
        width: FloatWidth,
    },
    Bool,
    Text,
    /// Truncates silently past `length` characters (0 = unlimited).
    #[serde(rename = "varchar")]
    VarChar { length: usize },
    /// Blank-padded to exactly `length` characters.
    Char { length: usize },
    Bytea,
    Timestamp,
    Enum { labels: Vec<String> },
    Array { element: Box<Kind> },
    /// Positional composite without slot names.
    Row { slots: Vec<Kind> },
    /// Composite with named slots.
    Record { columns: Arc<[Column]> },
    #[serde(rename = "hstore")]
    HStore,
}

impl Kind {
    pub fn small_int() -> Self {
        Kind::Integer { width: IntWidth::Int2 }
    }

    pub fn integer() -> Self {
        Kind::Integer { width: IntWidth::Int4 }
    }

    pub fn big_int() -> Self {
        Kind::Integer { width: IntWidth::Int8 }
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Kind::Numeric { precision, scale }
    }

    pub fn real() -> Self {
        Kind::Float { width: FloatWidth::Real }
    }

    pub fn double() -> Self {
        Kind::Float { width: FloatWidth::Double }
    }

    pub fn varchar(length: usize) -> Self {
        Kind::VarChar { length }
    }

    pub fn char(length: usize) -> Self {
        Kind::Char { length }
    }

    pub fn enumeration<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Kind::Enum { labels: labels.into_iter().map(Into::into).collect() }
    }

    pub fn array(element: Kind) -> Self {
        Kind::Array { element: Box::new(element) }
    }

    pub fn row(slots: impl IntoIterator<Item = Kind>) -> Self {
        Kind::Row { slots: slots.into_iter().collect() }
    }

    pub fn record(columns: impl IntoIterator<Item = Column>) -> Self {
        Kind::Record { columns: columns.into_iter().collect() }
    }

    // Aliases

    pub fn int2() -> Self {
        Self::small_int()
    }

    pub fn int4() -> Self {
        Self::integer()
    }

    pub fn int8() -> Self {
        Self::big_int()
    }

    pub fn serial() -> Self {
        Self::integer()
    }

    pub fn big_serial() -> Self {
        Self::big_int()
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self::numeric(precision, scale)
    }

    /// Build a value of this kind and decode `src` into it.
    ///
    /// # Example
    /// ```
    /// use pgvalue::Kind;
    ///
    /// let v = Kind::array(Kind::integer()).construct("{1,2,3}").unwrap();
    /// assert_eq!(v.to_string(), "{1,2,3}");
    /// ```
    pub fn construct(&self, src: impl Into<Source>) -> ValueResult<Value> {
        let mut value = Value::new(self);
        value.decode(src)?;
        Ok(value)
    }

    /// PostgreSQL type name, as used in a `::type` cast.
    ///
    /// Anonymous rows and records have no catalog name and render as
    /// `record`. Timestamps always name `timestamptz` and enums name `text`,
    /// so a cast against a `timestamp` or enum column needs the column's own
    /// name; use [`Column::cast_type`](crate::schema::Column::cast_type) there.
    pub fn type_name(&self) -> String {
        match self {
            Kind::Integer { width } => width.type_name().to_string(),
            Kind::Numeric { precision: 0, .. } => "numeric".to_string(),
            Kind::Numeric { precision, scale } => format!("numeric({precision},{scale})"),
            Kind::Float { width } => width.type_name().to_string(),
            Kind::Bool => "bool".to_string(),
            Kind::Text => "text".to_string(),
            Kind::VarChar { length: 0 } => "varchar".to_string(),
            Kind::VarChar { length } => format!("varchar({length})"),
            Kind::Char { length } => format!("bpchar({length})"),
            Kind::Bytea => "bytea".to_string(),
            Kind::Timestamp => "timestamptz".to_string(),
            Kind::Enum { .. } => "text".to_string(),
            Kind::Array { element } => format!("{}[]", element.type_name()),
            Kind::Row { .. } | Kind::Record { .. } => "record".to_string(),
            Kind::HStore => "hstore".to_string(),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}
