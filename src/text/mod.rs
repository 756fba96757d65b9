//! PostgreSQL literal text (Layer 1: Pure, Sync)
//!
//! Byte-level transforms over array, row and hstore literals.
//! No value kinds here - just bytes in, bytes (or parts) out.

pub mod escape;
pub mod hstore;
pub mod split;

pub use escape::{decode_hex_bytea, encode_hex_bytea, escape, unescape, Dialect};
pub use hstore::{parse_hstore, write_hstore};
pub use split::{split, Mode, Part, NULL_TOKEN};
