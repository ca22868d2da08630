//! Frame error types.
//!
//! Provides [`FrameError`] for field construction, row operations, the JSON
//! wire codec and the Arrow bridge, plus a convenience [`FrameResult`] alias.
//!
//! Out-of-range indices and unchecked type mismatches are programming errors
//! and panic instead of surfacing here.

use thiserror::Error;

use crate::types::FieldType;

/// Result alias for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;

/// Errors that can occur while building, validating or serializing frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A runtime value has no matching field type (e.g. an untyped null).
    #[error("unsupported field type: {0}")]
    UnsupportedFieldType(String),

    /// A canonical type name in a wire schema is not recognized.
    #[error("unknown field type name '{0}'")]
    UnknownFieldTypeName(String),

    /// The JSON payload is structurally invalid.
    #[error("malformed wire data: {0}")]
    MalformedWireData(String),

    /// The frame has no fields, so it has no row length.
    #[error("frame has no fields")]
    NoFields,

    /// Fields of a frame have unequal lengths.
    #[error(
        "frame has different field lengths, field 0 is len {expected} but field {field_index} is len {actual}"
    )]
    RowLengthMismatch {
        /// Index of the first field whose length disagrees with field 0.
        field_index: usize,
        /// Length of field 0.
        expected: usize,
        /// Length of the offending field.
        actual: usize,
    },

    /// A row has a different number of values than the frame has fields.
    #[error("failed to append row: frame has {expected} fields but row has {actual} values")]
    RowArityMismatch {
        /// Number of fields in the frame.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A row value does not match the declared type of its field.
    #[error(
        "failed to append row: field {field_index} has type {expected} but value has type {actual}"
    )]
    RowTypeMismatch {
        /// Index of the offending field.
        field_index: usize,
        /// The field's declared type.
        expected: FieldType,
        /// Description of the supplied value's type.
        actual: String,
    },

    /// A timestamp does not fit the representable time range.
    #[error("time value out of range: {0}")]
    TimeOutOfRange(String),

    /// An Arrow column type has no field type mapping.
    #[error("unsupported arrow type {0}")]
    UnsupportedArrowType(String),

    /// A field cannot be read as a float.
    #[error("field type {0} is not numeric")]
    NotNumeric(FieldType),

    /// A labels string could not be parsed.
    #[error("invalid labels: {0}")]
    InvalidLabels(String),

    /// A configuration value is invalid.
    #[error("invalid config key '{key}': {message}")]
    InvalidConfig {
        /// The configuration key.
        key: String,
        /// What was wrong with the value.
        message: String,
    },

    /// A row predicate failed while filtering.
    #[error("predicate failed: {0}")]
    Predicate(String),

    /// An Arrow error propagated from the Arrow bridge.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// A JSON error from `serde_json`.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FrameError {
    /// Shorthand for [`FrameError::MalformedWireData`].
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedWireData(msg.into())
    }
}
