//! pgvalue - PostgreSQL text-format value codec
//!
//! Reads and writes the literal forms PostgreSQL uses on the text wire
//! protocol: scalars, arrays `{...}`, composite rows `(...)` and hstore
//! `"k"=>"v"` maps, with full quoting, escaping and NULL handling.
//!
//! NO I/O, NO async - just bytes in, values out.
//!
//! # Layers
//! - [`text`]: byte-level splitter, escaper and hstore scanner
//! - [`value`]: the [`Value`] tree, one codec per [`Kind`]
//! - [`schema`]: column metadata for records, loadable from JSON/TOML
//!
//! # Example
//! ```
//! use pgvalue::{Column, Kind, Native};
//!
//! let person = Kind::record([
//!     Column::new("id", Kind::integer()),
//!     Column::new("name", Kind::Text),
//!     Column::new("tags", Kind::array(Kind::Text)),
//! ]);
//!
//! let row = person.construct(r#"(1,"jeff \"the\" bob","{a,b}")"#).unwrap();
//! assert_eq!(row.get("name"), Native::Text(r#"jeff "the" bob"#.to_string()));
//! assert_eq!(row.value_by("tags").unwrap().values().len(), 2);
//! assert_eq!(row.to_string(), r#"(1,"jeff ""the"" bob","{""a"",""b""}")"#);
//! ```

pub mod error;
pub mod kind;
pub mod schema;
pub mod source;
pub mod text;
pub mod value;

pub use error::{ValueError, ValueResult};
pub use kind::{FloatWidth, IntWidth, Kind};
pub use schema::{Column, Relation, Schema, SchemaError};
pub use source::{Native, Source};
pub use value::{Codec, Value};
