//! Integer, numeric, float and bool codecs.

use std::num::IntErrorKind;

use bytes::BytesMut;

use super::{mismatch, utf8, Codec};
use crate::error::{ValueError, ValueResult};
use crate::kind::{FloatWidth, IntWidth, Kind};
use crate::source::{Native, Source};

// ==================== Integer ====================

/// `int2` / `int4` / `int8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerValue {
    width: IntWidth,
    value: Option<i64>,
}

impl IntegerValue {
    pub fn new(width: IntWidth) -> Self {
        Self { width, value: None }
    }

    pub fn get(&self) -> Option<i64> {
        self.value
    }

    fn fit(&self, n: i128) -> ValueResult<i64> {
        let fitted = match self.width {
            IntWidth::Int2 => i16::try_from(n).map(i64::from),
            IntWidth::Int4 => i32::try_from(n).map(i64::from),
            IntWidth::Int8 => i64::try_from(n),
        };
        fitted.map_err(|_| ValueError::Range { value: n.to_string(), target: self.width.type_name() })
    }

    fn parse(&self, text: &[u8]) -> ValueResult<i64> {
        let target = self.width.type_name();
        let s = std::str::from_utf8(text).map_err(|_| ValueError::parse(text, target))?.trim();
        match s.parse::<i128>() {
            Ok(n) => self.fit(n),
            // digits too wide even for i128
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(ValueError::Range { value: s.to_string(), target })
            }
            Err(_) => Err(ValueError::parse(text, target)),
        }
    }
}

impl Codec for IntegerValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Int(n) => Some(self.fit(i128::from(n))?),
            Source::UInt(n) => Some(self.fit(i128::from(n))?),
            Source::Str(s) => Some(self.parse(s.as_bytes())?),
            Source::Bytes(b) => Some(self.parse(&b)?),
            other => return Err(mismatch(&self.kind(), &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(n) = self.value {
            buf.extend_from_slice(itoa::Buffer::new().format(n).as_bytes());
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Integer { width: self.width }
    }

    fn to_native(&self) -> Native {
        self.value.map_or(Native::Null, Native::Int)
    }
}

// ==================== Numeric ====================

/// Arbitrary precision number, kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericValue {
    precision: u32,
    scale: u32,
    value: Option<String>,
}

impl NumericValue {
    pub fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale, value: None }
    }

    pub fn get(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Codec for NumericValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Str(s) => Some(s),
            Source::Bytes(b) => Some(utf8(b, "numeric")?),
            Source::Int(n) => Some(itoa::Buffer::new().format(n).to_string()),
            Source::UInt(n) => Some(itoa::Buffer::new().format(n).to_string()),
            Source::Float(x) if x.is_finite() => Some(format!("{:.*}", self.scale as usize, x)),
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
        Kind::Numeric { precision: self.precision, scale: self.scale }
    }

    fn to_native(&self) -> Native {
        self.value.clone().map_or(Native::Null, Native::Numeric)
    }
}

// ==================== Float ====================

/// `float4` / `float8`. Real values are stored already narrowed to `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatValue {
    width: FloatWidth,
    value: Option<f64>,
}

impl FloatValue {
    pub fn new(width: FloatWidth) -> Self {
        Self { width, value: None }
    }

    pub fn get(&self) -> Option<f64> {
        self.value
    }

    fn narrow(&self, x: f64) -> ValueResult<f64> {
        match self.width {
            FloatWidth::Double => Ok(x),
            FloatWidth::Real if x.is_finite() && x.abs() > f64::from(f32::MAX) => {
                Err(ValueError::Range { value: x.to_string(), target: self.width.type_name() })
            }
            FloatWidth::Real => Ok(f64::from(x as f32)),
        }
    }

    fn parse(&self, text: &[u8]) -> ValueResult<f64> {
        let err = || ValueError::parse(text, self.width.type_name());
        let s = std::str::from_utf8(text).map_err(|_| err())?.trim();
        let x = s.parse::<f64>().map_err(|_| err())?;
        match self.width {
            FloatWidth::Double => Ok(x),
            // parse narrow directly; going through f64 can double-round
            FloatWidth::Real => {
                self.narrow(x)?;
                s.parse::<f32>().map(f64::from).map_err(|_| err())
            }
        }
    }
}

impl Codec for FloatValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match src {
            Source::Null => None,
            Source::Float(x) => Some(self.narrow(x)?),
            Source::Int(n) => Some(self.narrow(n as f64)?),
            Source::UInt(n) => Some(self.narrow(n as f64)?),
            Source::Str(s) => Some(self.parse(s.as_bytes())?),
            Source::Bytes(b) => Some(self.parse(&b)?),
            other => return Err(mismatch(&self.kind(), &other)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        let Some(x) = self.value else { return };
        if x.is_nan() {
            buf.extend_from_slice(b"NaN");
        } else if x.is_infinite() {
            let text: &[u8] = if x > 0.0 { b"Infinity" } else { b"-Infinity" };
            buf.extend_from_slice(text);
        } else {
            let mut fmt = ryu::Buffer::new();
            let text = match self.width {
                FloatWidth::Real => fmt.format_finite(x as f32),
                FloatWidth::Double => fmt.format_finite(x),
            };
            buf.extend_from_slice(text.as_bytes());
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Float { width: self.width }
    }

    fn to_native(&self) -> Native {
        self.value.map_or(Native::Null, Native::Float)
    }
}

// ==================== Bool ====================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolValue {
    value: Option<bool>,
}

impl BoolValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<bool> {
        self.value
    }
}

impl Codec for BoolValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.value = match &src {
            Source::Null => None,
            Source::Bool(b) => Some(*b),
            Source::Int(0) | Source::UInt(0) => Some(false),
            Source::Int(1) | Source::UInt(1) => Some(true),
            Source::Str(s) => Some(bool_text(s.as_bytes()).ok_or_else(|| mismatch(&Kind::Bool, &src))?),
            Source::Bytes(b) => Some(bool_text(b).ok_or_else(|| mismatch(&Kind::Bool, &src))?),
            _ => return Err(mismatch(&Kind::Bool, &src)),
        };
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(b) = self.value {
            buf.extend_from_slice(if b { b"t" } else { b"f" });
        }
    }

    fn is_null(&self) -> bool {
        self.value.is_none()
    }

    fn kind(&self) -> Kind {
        Kind::Bool
    }

    fn to_native(&self) -> Native {
        self.value.map_or(Native::Null, Native::Bool)
    }
}

/// Leading `t`/`T`/`1` or `f`/`F`/`0`; covers `true`, `TRUE`, `f`.
fn bool_text(text: &[u8]) -> Option<bool> {
    match text.first()? {
        b't' | b'T' | b'1' => Some(true),
        b'f' | b'F' | b'0' => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn decoded(kind: Kind, src: impl Into<Source>) -> ValueResult<Value> {
        kind.construct(src)
    }

    #[test]
    fn test_integer_from_text_and_native() {
        assert_eq!(decoded(Kind::integer(), "42").unwrap().as_i64(), Some(42));
        assert_eq!(decoded(Kind::integer(), &b"-7"[..]).unwrap().as_i64(), Some(-7));
        assert_eq!(decoded(Kind::big_int(), u64::from(u32::MAX)).unwrap().as_i64(), Some(4294967295));
        assert_eq!(&decoded(Kind::small_int(), 12).unwrap().encode()[..], b"12");
    }

    #[test]
    fn test_integer_range() {
        assert!(decoded(Kind::small_int(), 32767).is_ok());
        assert!(decoded(Kind::small_int(), -32768).is_ok());
        assert_eq!(
            decoded(Kind::small_int(), 32768),
            Err(ValueError::Range { value: "32768".to_string(), target: "int2" })
        );
        assert!(matches!(decoded(Kind::integer(), "2147483648"), Err(ValueError::Range { .. })));
        assert!(matches!(decoded(Kind::big_int(), u64::MAX), Err(ValueError::Range { .. })));
    }

    #[test]
    fn test_integer_wider_than_i128_is_range() {
        let huge = "170141183460469231731687303715884105728";
        assert_eq!(
            decoded(Kind::big_int(), huge),
            Err(ValueError::Range { value: huge.to_string(), target: "int8" })
        );
        assert!(matches!(
            decoded(Kind::small_int(), "-999999999999999999999999999999999999999999"),
            Err(ValueError::Range { .. })
        ));
        assert!(matches!(decoded(Kind::big_int(), "x99999999999999999999999999999999999999999"), Err(ValueError::Parse { .. })));
    }

    #[test]
    fn test_integer_rejects() {
        assert!(matches!(decoded(Kind::integer(), "4x"), Err(ValueError::Parse { .. })));
        assert!(matches!(decoded(Kind::integer(), 1.5), Err(ValueError::TypeMismatch { .. })));
        assert!(matches!(decoded(Kind::integer(), true), Err(ValueError::TypeMismatch { .. })));
    }

    #[test]
    fn test_numeric_is_verbatim() {
        let v = decoded(Kind::numeric(10, 4), "123.4500").unwrap();
        assert_eq!(&v.encode()[..], b"123.4500");
        assert_eq!(v.to_native(), Native::Numeric("123.4500".to_string()));
    }

    #[test]
    fn test_numeric_from_native() {
        assert_eq!(decoded(Kind::numeric(6, 2), 1.5).unwrap().as_str(), Some("1.50"));
        assert_eq!(decoded(Kind::numeric(6, 0), 17).unwrap().as_str(), Some("17"));
        assert!(decoded(Kind::numeric(6, 0), f64::NAN).is_err());
    }

    #[test]
    fn test_float_encode() {
        assert_eq!(&decoded(Kind::double(), 1.5).unwrap().encode()[..], b"1.5");
        assert_eq!(&decoded(Kind::real(), 0.1f32).unwrap().encode()[..], b"0.1");
        assert_eq!(&decoded(Kind::double(), f64::INFINITY).unwrap().encode()[..], b"Infinity");
        assert_eq!(&decoded(Kind::double(), f64::NEG_INFINITY).unwrap().encode()[..], b"-Infinity");
        assert_eq!(&decoded(Kind::double(), f64::NAN).unwrap().encode()[..], b"NaN");
    }

    #[test]
    fn test_float_parse_special() {
        assert_eq!(decoded(Kind::double(), "Infinity").unwrap().as_f64(), Some(f64::INFINITY));
        assert!(decoded(Kind::double(), "NaN").unwrap().as_f64().unwrap().is_nan());
        assert_eq!(decoded(Kind::real(), "-2.5").unwrap().as_f64(), Some(-2.5));
    }

    #[test]
    fn test_real_range_and_narrowing() {
        assert!(matches!(decoded(Kind::real(), 1e39), Err(ValueError::Range { .. })));
        assert!(matches!(decoded(Kind::real(), "1e39"), Err(ValueError::Range { .. })));
        let v = decoded(Kind::real(), 0.1f64).unwrap();
        assert_eq!(v.as_f64(), Some(f64::from(0.1f32)));
        let again = decoded(Kind::real(), &v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_bool_inputs() {
        for src in ["t", "true", "TRUE", "1"] {
            assert_eq!(decoded(Kind::Bool, src).unwrap().as_bool(), Some(true), "{src}");
        }
        for src in ["f", "false", "F", "0"] {
            assert_eq!(decoded(Kind::Bool, src).unwrap().as_bool(), Some(false), "{src}");
        }
        assert_eq!(decoded(Kind::Bool, true).unwrap().as_bool(), Some(true));
        assert_eq!(decoded(Kind::Bool, 0).unwrap().as_bool(), Some(false));
        assert_eq!(&decoded(Kind::Bool, 1).unwrap().encode()[..], b"t");
    }

    #[test]
    fn test_bool_rejects() {
        assert!(matches!(decoded(Kind::Bool, "yes"), Err(ValueError::TypeMismatch { .. })));
        assert!(matches!(decoded(Kind::Bool, ""), Err(ValueError::TypeMismatch { .. })));
        assert!(matches!(decoded(Kind::Bool, 2), Err(ValueError::TypeMismatch { .. })));
        assert!(matches!(decoded(Kind::Bool, 1.0), Err(ValueError::TypeMismatch { .. })));
    }

    #[test]
    fn test_null_resets() {
        let mut v = decoded(Kind::integer(), 5).unwrap();
        v.decode(Source::Null).unwrap();
        assert!(v.is_null());
        assert_eq!(v.to_native(), Native::Null);
    }
}
