//! Error types for filter parsing, whitelist validation and configuration.

use thiserror::Error;

/// Stable marker every [`SyntaxError`] message starts with.
///
/// Callers that only see the rendered message (HTTP layers, logs) can detect
/// the failure class with `message.contains(INVALID_FILTER_SYNTAX)`.
pub const INVALID_FILTER_SYNTAX: &str = "invalid filter syntax";

/// Malformed filter text.
///
/// Carries the original input and the diagnostic for the first point of
/// failure. The parser never returns a partial tree alongside this error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter syntax: {message} (filter: {input})")]
pub struct SyntaxError {
    /// The filter string exactly as it was passed to the parser.
    pub input: String,
    /// Diagnostic describing the failure point.
    pub message: String,
    /// Byte offset of the offending token, or the input length at end of input.
    pub position: usize,
}

impl SyntaxError {
    pub(crate) fn new(input: &str, position: usize, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            message: message.into(),
            position,
        }
    }
}

/// A whitelist or pagination-ceiling violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is not in the allowed list.
    #[error("field '{field}' is not allowed. Allowed fields: [{}]", .allowed.join(", "))]
    FieldNotAllowed {
        /// The offending field name.
        field: String,
        /// Every allowed field, sorted.
        allowed: Vec<String>,
    },
    /// Requested limit is above the configured ceiling.
    #[error("limit {limit} exceeds maximum allowed limit of {max}")]
    LimitExceeded {
        /// Requested limit.
        limit: i64,
        /// Configured ceiling.
        max: i64,
    },
    /// Requested offset is above the configured ceiling.
    #[error("offset {offset} exceeds maximum allowed offset of {max}")]
    OffsetExceeded {
        /// Requested offset.
        offset: i64,
        /// Configured ceiling.
        max: i64,
    },
}

/// Umbrella error for the query-string entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The `filter` parameter could not be parsed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// A field, limit or offset was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A configuration document could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}
