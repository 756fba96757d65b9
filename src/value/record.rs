//! Row and record codecs.
//!
//! Both are fixed-arity composites written as `(...)`. A row is positional;
//! a record shares its column metadata with every sibling built from the
//! same relation.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::BytesMut;

use super::{Codec, Value};
use crate::error::{ValueError, ValueResult};
use crate::kind::Kind;
use crate::schema::Column;
use crate::source::{Native, Source};
use crate::text::{escape, split, Dialect, Mode, Part};

/// Anonymous positional composite.
#[derive(Debug, Clone, PartialEq)]
pub struct RowValue {
    values: Vec<Value>,
    valid: bool,
}

impl RowValue {
    pub fn new(slots: &[Kind]) -> Self {
        Self { values: slots.iter().map(Value::new).collect(), valid: false }
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
}

impl Codec for RowValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.valid = decode_slots(&mut self.values, src)?;
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        encode_slots(&self.values, buf);
    }

    fn is_null(&self) -> bool {
        !self.valid
    }

    fn kind(&self) -> Kind {
        Kind::Row { slots: self.values.iter().map(Value::kind).collect() }
    }

    fn to_native(&self) -> Native {
        Native::List(self.values.iter().map(Value::to_native).collect())
    }
}

/// Composite with named, typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    columns: Arc<[Column]>,
    values: Vec<Value>,
    valid: bool,
}

impl RecordValue {
    pub fn new(columns: Arc<[Column]>) -> Self {
        let values = columns.iter().map(|c| Value::new(&c.kind)).collect();
        Self { columns, values, valid: false }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
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

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn value_by(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.values[i])
    }

    pub fn value_by_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.position(name).map(move |i| &mut self.values[i])
    }

    /// Decode `src` into the named column and mark the record non-NULL.
    pub fn set(&mut self, name: &str, src: impl Into<Source>) -> ValueResult<()> {
        let idx = self.position(name).ok_or_else(|| ValueError::NotFound(name.to_string()))?;
        self.values[idx].decode(src)?;
        self.valid = true;
        Ok(())
    }

    pub fn map(&self) -> BTreeMap<&str, &Value> {
        self.columns.iter().map(|c| c.name.as_str()).zip(&self.values).collect()
    }
}

impl Codec for RecordValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.valid = decode_slots(&mut self.values, src)?;
        Ok(())
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        encode_slots(&self.values, buf);
    }

    fn is_null(&self) -> bool {
        !self.valid
    }

    fn kind(&self) -> Kind {
        Kind::Record { columns: Arc::clone(&self.columns) }
    }

    fn to_native(&self) -> Native {
        Native::Map(
            self.columns
                .iter()
                .zip(&self.values)
                .map(|(c, v)| (c.name.clone(), v.to_native()))
                .collect(),
        )
    }
}

/// Decode into fixed slots; returns whether the composite is non-NULL.
fn decode_slots(slots: &mut [Value], src: Source) -> ValueResult<bool> {
    match src {
        Source::Null => {
            for slot in slots.iter_mut() {
                slot.decode(Source::Null)?;
            }
            Ok(false)
        }
        Source::List(items) => {
            check_arity(slots.len(), items.len())?;
            for (slot, item) in slots.iter_mut().zip(items) {
                slot.decode(item)?;
            }
            Ok(true)
        }
        Source::Str(s) => decode_literal(slots, s.as_bytes()),
        Source::Bytes(b) => decode_literal(slots, &b),
        other => Err(ValueError::TypeMismatch {
            target: "record".to_string(),
            found: other.type_name(),
        }),
    }
}

fn decode_literal(slots: &mut [Value], literal: &[u8]) -> ValueResult<bool> {
    if Mode::detect(literal)? != Mode::Row {
        return Err(ValueError::malformed(format!(
            "expected row literal: {}",
            String::from_utf8_lossy(literal)
        )));
    }
    let mut parts = split(literal)?;
    // `()` is a single NULL column
    if parts.is_empty() && slots.len() == 1 {
        parts.push(Part::Null);
    }
    check_arity(slots.len(), parts.len())?;
    for (index, (slot, part)) in slots.iter_mut().zip(parts).enumerate() {
        slot.decode(Source::from(part)).inspect_err(|e| {
            tracing::debug!(index, error = %e, "row slot decode failed");
        })?;
    }
    Ok(true)
}

fn check_arity(expected: usize, found: usize) -> ValueResult<()> {
    if expected != found {
        return Err(ValueError::Arity { expected, found });
    }
    Ok(())
}

/// NULL slots are written as nothing; non-numeric slots are quoted.
fn encode_slots(values: &[Value], buf: &mut BytesMut) {
    buf.extend_from_slice(b"(");
    for (i, child) in values.iter().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b",");
        }
        if child.is_null() {
            continue;
        }
        if child.bare_in_row() {
            child.encode_into(buf);
        } else {
            buf.extend_from_slice(b"\"");
            buf.extend_from_slice(&escape(&child.encode(), Dialect::Row));
            buf.extend_from_slice(b"\"");
        }
    }
    buf.extend_from_slice(b")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(v: &Value) -> String {
        String::from_utf8_lossy(&v.encode()).into_owned()
    }

    fn people() -> Kind {
        Kind::record([
            Column::new("id", Kind::integer()),
            Column::new("name", Kind::Text),
            Column::new("nick", Kind::Text),
        ])
    }

    #[test]
    fn test_row_decode() {
        let kind = Kind::row([Kind::integer(), Kind::Text, Kind::Text]);
        let v = kind.construct(r#"(1,"jeff \"the\" bob",)"#).unwrap();
        assert_eq!(v.value_at(0).unwrap().as_i64(), Some(1));
        assert_eq!(v.value_at(1).unwrap().as_str(), Some(r#"jeff "the" bob"#));
        assert!(v.value_at(2).unwrap().is_null());
    }

    #[test]
    fn test_row_encode_nulls_as_empty() {
        let kind = Kind::row([Kind::integer(), Kind::Text, Kind::Text]);
        let v = kind.construct(Source::List(vec![1.into(), "".into(), Source::Null])).unwrap();
        assert_eq!(text(&v), r#"(1,"",)"#);
    }

    #[test]
    fn test_row_quote_escaping() {
        let kind = Kind::row([Kind::Text]);
        let v = kind.construct(Source::list([r#"say "hi" \o/"#])).unwrap();
        assert_eq!(text(&v), r#"("say ""hi"" \\o/")"#);
        let again = kind.construct(&v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_row_with_array_slot() {
        let kind = Kind::row([Kind::integer(), Kind::array(Kind::Text)]);
        let v = kind.construct(r#"(7,"{a,""b c""}")"#).unwrap();
        assert_eq!(v.value_at(1).unwrap().values().len(), 2);
        assert_eq!(text(&v), r#"(7,"{""a"",""b c""}")"#);
        let again = kind.construct(&v.encode()[..]).unwrap();
        assert_eq!(again, v);
    }

    #[test]
    fn test_row_arity() {
        let kind = Kind::row([Kind::integer(), Kind::integer()]);
        assert_eq!(kind.construct("(1)"), Err(ValueError::Arity { expected: 2, found: 1 }));
        assert_eq!(
            kind.construct(Source::list([1, 2, 3])),
            Err(ValueError::Arity { expected: 2, found: 3 })
        );
        assert!(matches!(kind.construct("{1,2}"), Err(ValueError::MalformedLiteral(_))));
    }

    #[test]
    fn test_row_null() {
        let kind = Kind::row([Kind::integer()]);
        let mut v = kind.construct("(5)").unwrap();
        v.decode(Source::Null).unwrap();
        assert!(v.is_null());
        assert!(v.value_at(0).unwrap().is_null());
        assert_eq!(text(&v), "NULL");
    }

    #[test]
    fn test_single_null_column() {
        let kind = Kind::row([Kind::Text]);
        let v = kind.construct("()").unwrap();
        assert!(!v.is_null());
        assert!(v.value_at(0).unwrap().is_null());
        assert_eq!(text(&v), "()");
    }

    #[test]
    fn test_record_named_access() {
        let mut v = people().construct("(1,alice,)").unwrap();
        assert_eq!(v.get("name"), Native::Text("alice".to_string()));
        assert!(v.value_by("nick").unwrap().is_null());

        v.set("nick", "al").unwrap();
        assert_eq!(v.value_by("nick").unwrap().as_str(), Some("al"));
        assert_eq!(v.set("age", 3), Err(ValueError::NotFound("age".to_string())));

        let names: Vec<_> = v.map().unwrap().into_keys().collect();
        assert_eq!(names, vec!["id", "name", "nick"]);
    }

    #[test]
    fn test_record_set_marks_valid() {
        let mut v = Value::new(&people());
        v.set("id", 4).unwrap();
        assert!(!v.is_null());
        assert_eq!(text(&v), "(4,,)");
    }

    #[test]
    fn test_record_shares_columns() {
        let kind = people();
        let a = kind.construct("(1,a,b)").unwrap();
        let b = kind.construct("(2,c,d)").unwrap();
        match (&a, &b, &kind) {
            (Value::Record(a), Value::Record(b), Kind::Record { columns }) => {
                assert!(std::ptr::eq(a.columns(), b.columns()));
                assert!(std::ptr::eq(a.columns(), &columns[..]));
            }
            _ => panic!("expected records"),
        }
    }

    #[test]
    fn test_record_native() {
        let v = people().construct("(1,alice,)").unwrap();
        let json = serde_json::to_string(&v.to_native()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"alice","nick":null}"#);
    }

    #[test]
    fn test_nested_record() {
        let inner = Kind::record([Column::new("x", Kind::integer()), Column::new("y", Kind::Text)]);
        let outer = Kind::record([Column::new("p", inner), Column::new("n", Kind::integer())]);
        let v = outer.construct(r#"("(1,""a b"")",2)"#).unwrap();
        assert_eq!(v.value_by("p").unwrap().value_by("y").unwrap().as_str(), Some("a b"));
        assert_eq!(text(&v), r#"("(1,""a b"")",2)"#);
    }
}
