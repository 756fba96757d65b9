//! Slot metadata for records, and loading it from JSON/TOML.
//!
//! The core never derives this metadata; a schema collaborator (catalog
//! introspection, a checked-in schema file) supplies it.
//!
//! # Example
//! ```
//! use pgvalue::schema::Schema;
//!
//! let json = r#"{
//!     "relations": [{
//!         "name": "users",
//!         "columns": [
//!             { "name": "id", "type": { "type": "integer" }, "primary_key": true },
//!             { "name": "email", "type": { "type": "varchar", "length": 255 } }
//!         ]
//!     }]
//! }"#;
//!
//! let schema = Schema::from_json(json).unwrap();
//! let users = schema.relation("users").unwrap();
//! let row = users.new_record("(1,\"a@example.com\")").unwrap();
//! assert_eq!(row.value_by("email").unwrap().as_str(), Some("a@example.com"));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValueResult;
use crate::kind::Kind;
use crate::source::Source;
use crate::value::Value;

/// Errors loading or validating schema metadata.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid schema TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate column '{column}' in {relation}")]
    DuplicateColumn { relation: String, column: String },

    #[error("enum column '{column}' in {relation} has no labels")]
    EmptyEnum { relation: String, column: String },

    #[error("no relation {0}")]
    UnknownRelation(String),
}

/// Foreign reference target of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub table: String,
    pub column: String,
}

/// One named, typed slot of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: Kind,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
    /// Catalog type name for casts, when it differs from [`Kind::type_name`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// A nullable column with no key or reference.
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            primary_key: false,
            references: None,
            type_name: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as primary key (implies NOT NULL).
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(Reference { table: table.into(), column: column.into() });
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Type name for casts: the catalog name if known, else the kind's.
    pub fn cast_type(&self) -> String {
        self.type_name.clone().unwrap_or_else(|| self.kind.type_name())
    }
}

/// A named table or composite type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub columns: Arc<[Column]>,
}

impl Relation {
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self { name: name.into(), columns: columns.into_iter().collect() }
    }

    /// Record kind sharing this relation's column metadata.
    pub fn kind(&self) -> Kind {
        Kind::Record { columns: Arc::clone(&self.columns) }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First primary key column, if any.
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Build a record of this relation and decode `src` into it.
    pub fn new_record(&self, src: impl Into<Source>) -> ValueResult<Value> {
        self.kind().construct(src)
    }

    /// Check column names are unique and enums have labels, recursing into
    /// nested record kinds.
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_columns(&self.name, &self.columns)
    }
}

fn validate_columns(relation: &str, columns: &[Column]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.name.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                relation: relation.to_string(),
                column: column.name.clone(),
            });
        }
        validate_kind(relation, &column.name, &column.kind)?;
    }
    Ok(())
}

fn validate_kind(relation: &str, column: &str, kind: &Kind) -> Result<(), SchemaError> {
    match kind {
        Kind::Enum { labels } if labels.is_empty() => Err(SchemaError::EmptyEnum {
            relation: relation.to_string(),
            column: column.to_string(),
        }),
        Kind::Array { element } => validate_kind(relation, column, element),
        Kind::Row { slots } => slots.iter().try_for_each(|k| validate_kind(relation, column, k)),
        Kind::Record { columns } => validate_columns(&format!("{relation}.{column}"), columns),
        _ => Ok(()),
    }
}

/// A set of relations, typically loaded from a schema file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn relation(&self, name: &str) -> Result<&Relation, SchemaError> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| SchemaError::UnknownRelation(name.to_string()))
    }

    /// Load and validate a schema from JSON.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a schema from TOML.
    pub fn from_toml(input: &str) -> Result<Self, SchemaError> {
        let schema: Schema = toml::from_str(input)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        self.relations.iter().try_for_each(Relation::validate)
    }
}
