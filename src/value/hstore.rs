//! hstore codec: a string-keyed map of text values.

use std::collections::BTreeMap;

use bytes::BytesMut;

use super::{mismatch, Codec, Value};
use crate::error::ValueResult;
use crate::kind::Kind;
use crate::source::{Native, Source};
use crate::text::{parse_hstore, write_hstore};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HStoreValue {
    entries: BTreeMap<String, Value>,
    valid: bool,
}

impl HStoreValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value_by(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn value_by_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: &str, src: impl Into<Source>) -> ValueResult<()> {
        let mut value = Value::new(&Kind::Text);
        value.decode(src)?;
        self.entries.insert(key.to_string(), value);
        self.valid = true;
        Ok(())
    }

    pub fn map(&self) -> BTreeMap<&str, &Value> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v)).collect()
    }

    fn insert_text(&mut self, key: String, text: Option<String>) -> ValueResult<()> {
        let mut value = Value::new(&Kind::Text);
        value.decode(text)?;
        self.entries.insert(key, value);
        Ok(())
    }

    fn decode_literal(&mut self, literal: &[u8]) -> ValueResult<()> {
        for (key, value) in parse_hstore(literal)? {
            match value {
                Some(text) => self.insert_text(key, Some(text))?,
                None => tracing::debug!(%key, "dropping NULL hstore value"),
            }
        }
        Ok(())
    }
}

impl Codec for HStoreValue {
    fn decode(&mut self, src: Source) -> ValueResult<()> {
        self.entries.clear();
        self.valid = true;
        match src {
            Source::Null => {
                self.valid = false;
                Ok(())
            }
            Source::Str(s) => self.decode_literal(s.as_bytes()),
            Source::Bytes(b) => self.decode_literal(&b),
            Source::Map(map) => {
                map.into_iter().try_for_each(|(key, value)| self.insert_text(key, value))
            }
            other => Err(mismatch(&Kind::HStore, &other)),
        }
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        let pairs = self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str().map(str::as_bytes)));
        buf.extend_from_slice(&write_hstore(pairs));
    }

    fn is_null(&self) -> bool {
        !self.valid
    }

    fn kind(&self) -> Kind {
        Kind::HStore
    }

    fn to_native(&self) -> Native {
        Native::Map(self.entries.iter().map(|(k, v)| (k.clone(), v.to_native())).collect())
    }
}
