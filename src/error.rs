//! Decode and encode errors for PostgreSQL literal values.

use thiserror::Error;

/// Errors that can occur while decoding into a [`Value`](crate::Value).
///
/// A failed decode leaves its target valid but with an undefined payload;
/// callers must treat it as unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Structural parse failure: unmatched delimiter, unterminated quote,
    /// bad hex payload.
    #[error("malformed literal: {0}")]
    MalformedLiteral(String),

    /// Element or slot count mismatch.
    #[error("expected {expected} values, got {found}")]
    Arity { expected: usize, found: usize },

    /// A number does not fit the declared width.
    #[error("cannot fit {value} into {target}")]
    Range { value: String, target: &'static str },

    /// Fixed-length text overflow.
    #[error("cannot fit '{value}' into char({limit})")]
    Length { value: String, limit: usize },

    /// The source primitive is not accepted by the kind.
    #[error("cannot set {target} value from {found}")]
    TypeMismatch { target: String, found: &'static str },

    /// Text could not be parsed as the kind.
    #[error("cannot parse '{input}' as {target}")]
    Parse { input: String, target: &'static str },

    /// Enum text outside the label set.
    #[error("value should be one of {} got '{value}'", .labels.join(","))]
    InvalidEnumValue { value: String, labels: Vec<String> },

    /// Name lookup miss.
    #[error("no column {0}")]
    NotFound(String),
}

impl ValueError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ValueError::MalformedLiteral(reason.into())
    }

    pub(crate) fn parse(input: impl AsRef<[u8]>, target: &'static str) -> Self {
        ValueError::Parse {
            input: String::from_utf8_lossy(input.as_ref()).into_owned(),
            target,
        }
    }
}

/// Result type for value operations.
pub type ValueResult<T> = Result<T, ValueError>;
