//! Array codec.

use bytes::BytesMut;

use super::{mismatch, Codec, Value};
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::source::{Native, Source};
use crate::text::{escape, split, Dialect, Mode, Part};

/// Ordered, growable list of values of one element kind.
///
/// A braced element inside an array whose element kind is not itself an
/// array becomes a sub-dimension: a nested array of the same element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    element: Kind,
    values: Vec<Value>,
    valid: bool,
}

impl ArrayValue {
    pub fn new(element: Kind) -> Self {
        Self { element, values: Vec::new(), valid: false }
    }

    pub fn element(&self) -> &Kind {
        &self.element
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value_at_mut(&mut self, idx: usize) -> Option<&mut Value> {
        self.values.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append one element, built from `src` with the element kind.
    ///
    /// A pre-built value must have the element kind (or be a sub-dimension
    /// array of it), otherwise `TypeMismatch`.
    pub fn append(&mut self, src: impl Into<Source>) -> ValueResult<()> {
        let child = match src.into() {
            Source::Value(v) => {
                if !self.accepts(&v) {
                    tracing::debug!(element = %self.element, found = %v.kind(), "rejected array append");
                    return Err(ValueError::TypeMismatch {
                        target: self.element.type_name(),
                        found: "value",
                    });
                }
                v
            }
            Source::List(items) if !self.element_is_composite() => {
                let mut sub = Value::Array(ArrayValue::new(self.element.clone()));
                sub.decode(Source::List(items))?;
                sub
            }
            src => {
                let mut child = Value::new(&self.element);
                child.decode(src)?;
                child
            }
        };
        self.values.push(child);
        self.valid = true;
        Ok(())
    }

    fn accepts(&self, v: &Value) -> bool {
        match v {
            Value::Array(sub) if !matches!(self.element, Kind::Array { .. }) => {
                sub.element == self.element
            }
            other => other.kind() == self.element,
        }
    }

    /// Element kinds that take a list as their own input.
    fn element_is_composite(&self) -> bool {
        matches!(self.element, Kind::Array { .. } | Kind::Row { .. } | Kind::Record { .. })
    }

    fn decode_literal(&mut self, literal: &[u8]) -> ValueResult<()> {
        if Mode::detect(literal)? != Mode::Array {
            return Err(ValueError::malformed(format!(
                "expected array literal: {}",
                String::from_utf8_lossy(literal)
            )));
        }
        for (index, part) in split(literal)?.into_iter().enumerate() {
            let mut child = match part {
                Part::Nested(_) if !matches!(self.element, Kind::Array { .. }) => {
                    Value::Array(ArrayValue::new(self.element.clone()))
                }
                _ => Value::new(&self.element),
            };
            child.decode(Source::from(part)).inspect_err(|e| {
                tracing::debug!(index, element = %self.element, error = %e, "array element decode failed");
            })?;
            self.values.push(child);
        }
        Ok(())
    }
}

impl Codec for ArrayValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.values.clear();
        self.valid = true;
        match src {
            Source::Null => {
                self.valid = false;
                Ok(())
            }
            Source::List(items) => items.into_iter().try_for_each(|item| self.append(item)),
            Source::Str(s) => self.decode_literal(s.as_bytes()),
            Source::Bytes(b) => self.decode_literal(&b),
            other => Err(mismatch(&self.kind(), &other)),
        }
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(b"{");
        for (i, child) in self.values.iter().enumerate() {
            if i > 0 {
                buf.extend_from_slice(b",");
            }
            if child.is_null() || child.bare_in_array() {
                child.encode_into(buf);
            } else {
                buf.extend_from_slice(b"\"");
                buf.extend_from_slice(&escape(&child.encode(), Dialect::Array));
                buf.extend_from_slice(b"\"");
            }
        }
        buf.extend_from_slice(b"}");
    }

    fn is_null(&self) -> bool {
        !self.valid
    }

    fn kind(&self) -> Kind {
        Kind::array(self.element.clone())
    }

    fn to_native(&self) -> Native {
        Native::List(self.values.iter().map(Value::to_native).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use pretty_assertions::assert_eq;

    fn text(v: &Value) -> String {
        String::from_utf8_lossy(&v.encode()).into_owned()
    }

    #[test]
    fn test_int_array() {
        let v = Kind::array(Kind::integer()).construct("{1,2,3}").unwrap();
        let ints: Vec<_> = v.values().iter().map(Value::as_i64).collect();
        assert_eq!(ints, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(text(&v), "{1,2,3}");
    }

    #[test]
    fn test_empty_array() {
        let v = Kind::array(Kind::Text).construct("{}").unwrap();
        assert!(!v.is_null());
        assert!(v.values().is_empty());
        assert_eq!(text(&v), "{}");
    }

    #[test]
    fn test_text_array_quoting() {
        let v = Kind::array(Kind::Text)
            .construct(Source::list(["a b", "say \"hi\"", r"back\slash", "NULL", ""]))
            .unwrap();
        assert_eq!(text(&v), r#"{"a b","say \"hi\"","back\\slash","NULL",""}"#);
        let again = Kind::array(Kind::Text).construct(&v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_null_elements() {
        let v = Kind::array(Kind::Text).construct(r#"{NULL,"NULL"}"#).unwrap();
        assert!(v.value_at(0).unwrap().is_null());
        assert_eq!(v.value_at(1).unwrap().as_str(), Some("NULL"));
        assert_eq!(text(&v), r#"{NULL,"NULL"}"#);
    }

    #[test]
    fn test_nested_array_kind() {
        let kind = Kind::array(Kind::array(Kind::integer()));
        let v = kind.construct("{{1,2},{3,4}}").unwrap();
        assert_eq!(v.values().len(), 2);
        assert_eq!(v.value_at(1).unwrap().value_at(0).unwrap().as_i64(), Some(3));
        assert_eq!(text(&v), "{{1,2},{3,4}}");
    }

    #[test]
    fn test_sub_dimension() {
        let v = Kind::array(Kind::integer()).construct("{1,2,{3,4}}").unwrap();
        assert_eq!(v.values().len(), 3);
        let sub = v.value_at(2).unwrap();
        assert_eq!(sub.kind(), Kind::array(Kind::integer()));
        assert_eq!(sub.values().len(), 2);
        assert_eq!(text(&v), "{1,2,{3,4}}");
    }

    #[test]
    fn test_sub_dimension_from_list() {
        let src = Source::List(vec![Source::from(1), Source::list([2, 3])]);
        let v = Kind::array(Kind::integer()).construct(src).unwrap();
        assert_eq!(text(&v), "{1,{2,3}}");
    }

    #[test]
    fn test_array_of_rows() {
        let kind = Kind::array(Kind::row([Kind::integer(), Kind::Text]));
        let v = kind.construct(r#"{"(1,a)","(2,\"b c\")"}"#).unwrap();
        assert_eq!(v.value_at(1).unwrap().value_at(1).unwrap().as_str(), Some("b c"));
        assert_eq!(text(&v), r#"{"(1,\"a\")","(2,\"b c\")"}"#);
        let again = kind.construct(&v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_array_of_records_from_lists() {
        let kind = Kind::array(Kind::record([Column::new("id", Kind::integer())]));
        let v = kind.construct(Source::List(vec![Source::list([1]), Source::list([2])])).unwrap();
        assert_eq!(text(&v), r#"{"(1)","(2)"}"#);
    }

    #[test]
    fn test_timestamp_elements_bare() {
        let v = Kind::array(Kind::Timestamp).construct(r#"{"2024-01-02 03:04:05+00"}"#).unwrap();
        assert_eq!(text(&v), "{2024-01-02T03:04:05Z}");
    }

    #[test]
    fn test_bytea_elements() {
        let v = Kind::array(Kind::Bytea).construct(r#"{"\\x4869",NULL}"#).unwrap();
        assert_eq!(v.value_at(0).unwrap().as_bytes(), Some(&b"Hi"[..]));
        assert_eq!(text(&v), r#"{"\\x4869",NULL}"#);
    }

    #[test]
    fn test_append() {
        let mut v = Value::new(&Kind::array(Kind::integer()));
        v.append(1).unwrap();
        v.append("2").unwrap();
        v.append(Source::Null).unwrap();
        assert_eq!(text(&v), "{1,2,NULL}");

        let prebuilt = Kind::integer().construct(9).unwrap();
        v.append(prebuilt).unwrap();
        assert_eq!(v.values().len(), 4);
    }

    #[test]
    fn test_append_rejects_wrong_kind() {
        let mut v = Value::new(&Kind::array(Kind::integer()));
        let wrong = Kind::Text.construct("x").unwrap();
        assert!(matches!(v.append(wrong), Err(ValueError::TypeMismatch { .. })));
        assert!(matches!(v.append("x"), Err(ValueError::Parse { .. })));
    }

    #[test]
    fn test_malformed() {
        let kind = Kind::array(Kind::integer());
        assert!(matches!(kind.construct("{1,2"), Err(ValueError::MalformedLiteral(_))));
        assert!(matches!(kind.construct("(1,2)"), Err(ValueError::MalformedLiteral(_))));
        assert!(matches!(kind.construct("1,2"), Err(ValueError::MalformedLiteral(_))));
        assert!(matches!(kind.construct(true), Err(ValueError::TypeMismatch { .. })));
    }

    #[test]
    fn test_native() {
        let v = Kind::array(Kind::integer()).construct("{1,NULL}").unwrap();
        assert_eq!(v.to_native(), Native::List(vec![Native::Int(1), Native::Null]));
    }
}
