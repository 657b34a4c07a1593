//! Error types for token preparation, annotation decoding and annotation edits
//!
//! Three severities exist:
//!
//! - [`ValidationError`] aborts preparation of a unit. Token input that is malformed or
//!   overlapping must be surfaced to the caller, never turned into partial tokens.
//! - [`ResolutionWarning`] is never returned as an `Err`. Decoding drops the offending
//!   record, logs it and hands the warning back next to the maps.
//! - [`AnnotationError`] rejects a single edit in the annotation manager and leaves the
//!   maps untouched.

use thiserror::Error;

/// Errors raised while importing or preparing tokens for a unit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A token row has neither a `text` nor a `token` value
    #[error("Invalid token data: token {index} must have a 'text' or 'token' field")]
    MissingText { index: usize },

    /// A token extends past the explicit offset of the next token in the same field
    #[error(
        "Invalid token position data: the length of {text:?} on position {offset} exceeds the offset of the next token ({next_offset})"
    )]
    Overlap {
        index: usize,
        text: String,
        offset: usize,
        next_offset: usize,
    },

    /// Column-oriented token input where the columns disagree in length
    #[error("Invalid token columns: column '{column}' has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A token row that cannot be read as a token at all
    #[error("Invalid token data at token {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

/// Why an annotation record could not be placed on the token sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionProblem {
    /// No token of the field covers the record's offset
    UnknownPosition { field: String, offset: usize },
    /// The record's direct token index is past the end of the sequence
    IndexOutOfRange { index: usize },
    /// The field named by the record has no tokens
    UnknownField { field: String },
    /// A span record without `field` cannot be resolved by offset
    MissingField,
    /// A relation endpoint does not match any span annotation
    DanglingEndpoint,
}

/// A record dropped during decoding
///
/// Usually this is stale data: annotations made against an earlier version of the
/// document. The rest of the unit still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Dropped annotation {variable}={value}: {problem:?}")]
pub struct ResolutionWarning {
    pub variable: String,
    pub value: String,
    pub problem: ResolutionProblem,
}

/// Rejected edits in the annotation manager
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Token index {index} is out of range (unit has {len} tokens)")]
    TokenOutOfRange { index: usize, len: usize },

    #[error("Invalid span: start {start} is after end {end}")]
    ReversedSpan { start: usize, end: usize },

    #[error("Span {start}..={end} crosses from field '{from_field}' into '{to_field}'")]
    CrossFieldSpan {
        start: usize,
        end: usize,
        from_field: String,
        to_field: String,
    },

    #[error("No span annotation {variable}|{value} at token {index}")]
    NoSpanAnnotation {
        index: usize,
        variable: String,
        value: String,
    },

    #[error("Relation endpoint {variable}|{value} at tokens {start}..={end} is not a span annotation")]
    DanglingEndpoint {
        variable: String,
        value: String,
        start: usize,
        end: usize,
    },
}
