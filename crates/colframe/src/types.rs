//! The closed set of field element types.
//!
//! Every [`FieldType`] has exactly one nullable and one non-nullable
//! counterpart. The canonical item-type names (`"int8"`, `"*int8"`,
//! `"time.Time"`, ...) are part of the JSON wire schema and must stay stable.
//!
//! | Element | Non-nullable | Nullable | Display type |
//! |---------|--------------|----------|--------------|
//! | `i8`..`i64` | `int8`..`int64` | `*int8`..`*int64` | `number` |
//! | `u8`..`u64` | `uint8`..`uint64` | `*uint8`..`*uint64` | `number` |
//! | `f32`, `f64` | `float32`, `float64` | `*float32`, `*float64` | `number` |
//! | `String` | `string` | `*string` | `string` |
//! | `bool` | `bool` | `*bool` | `boolean` |
//! | `DateTime<Utc>` | `time.Time` | `*time.Time` | `time` |
//! | `RawJson` | `json.RawMessage` | `*json.RawMessage` | `other` |
//! | `EnumItemIndex` | `enum` | `*enum` | `enum` |

use std::fmt;

use crate::error::{FrameError, FrameResult};

/// Identifies a vector's element type and nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Sentinel for an unknown or unsupported type.
    Unknown,
    /// `i8`.
    Int8,
    /// `Option<i8>`.
    NullableInt8,
    /// `i16`.
    Int16,
    /// `Option<i16>`.
    NullableInt16,
    /// `i32`.
    Int32,
    /// `Option<i32>`.
    NullableInt32,
    /// `i64`.
    Int64,
    /// `Option<i64>`.
    NullableInt64,
    /// `u8`.
    Uint8,
    /// `Option<u8>`.
    NullableUint8,
    /// `u16`.
    Uint16,
    /// `Option<u16>`.
    NullableUint16,
    /// `u32`.
    Uint32,
    /// `Option<u32>`.
    NullableUint32,
    /// `u64`.
    Uint64,
    /// `Option<u64>`.
    NullableUint64,
    /// `f32`.
    Float32,
    /// `Option<f32>`.
    NullableFloat32,
    /// `f64`.
    Float64,
    /// `Option<f64>`.
    NullableFloat64,
    /// `String`.
    String,
    /// `Option<String>`.
    NullableString,
    /// `bool`.
    Bool,
    /// `Option<bool>`.
    NullableBool,
    /// `DateTime<Utc>`.
    Time,
    /// `Option<DateTime<Utc>>`.
    NullableTime,
    /// Raw JSON text.
    Json,
    /// Optional raw JSON text.
    NullableJson,
    /// Enum item index (`u16`).
    Enum,
    /// Optional enum item index.
    NullableEnum,
}

const ALL_TYPES: [FieldType; 30] = [
    FieldType::Int8,
    FieldType::NullableInt8,
    FieldType::Int16,
    FieldType::NullableInt16,
    FieldType::Int32,
    FieldType::NullableInt32,
    FieldType::Int64,
    FieldType::NullableInt64,
    FieldType::Uint8,
    FieldType::NullableUint8,
    FieldType::Uint16,
    FieldType::NullableUint16,
    FieldType::Uint32,
    FieldType::NullableUint32,
    FieldType::Uint64,
    FieldType::NullableUint64,
    FieldType::Float32,
    FieldType::NullableFloat32,
    FieldType::Float64,
    FieldType::NullableFloat64,
    FieldType::String,
    FieldType::NullableString,
    FieldType::Bool,
    FieldType::NullableBool,
    FieldType::Time,
    FieldType::NullableTime,
    FieldType::Json,
    FieldType::NullableJson,
    FieldType::Enum,
    FieldType::NullableEnum,
];

impl FieldType {
    /// All supported field types (excluding [`FieldType::Unknown`]).
    #[must_use]
    pub fn all() -> &'static [FieldType] {
        &ALL_TYPES
    }

    /// Returns `true` for the `Option<_>` variants.
    #[must_use]
    pub const fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::NullableInt8
                | Self::NullableInt16
                | Self::NullableInt32
                | Self::NullableInt64
                | Self::NullableUint8
                | Self::NullableUint16
                | Self::NullableUint32
                | Self::NullableUint64
                | Self::NullableFloat32
                | Self::NullableFloat64
                | Self::NullableString
                | Self::NullableBool
                | Self::NullableTime
                | Self::NullableJson
                | Self::NullableEnum
        )
    }

    /// Returns the nullable counterpart of this type (identity for nullable types).
    ///
    /// # Panics
    ///
    /// Panics on [`FieldType::Unknown`].
    #[must_use]
    pub const fn nullable_type(self) -> FieldType {
        match self {
            Self::Int8 | Self::NullableInt8 => Self::NullableInt8,
            Self::Int16 | Self::NullableInt16 => Self::NullableInt16,
            Self::Int32 | Self::NullableInt32 => Self::NullableInt32,
            Self::Int64 | Self::NullableInt64 => Self::NullableInt64,
            Self::Uint8 | Self::NullableUint8 => Self::NullableUint8,
            Self::Uint16 | Self::NullableUint16 => Self::NullableUint16,
            Self::Uint32 | Self::NullableUint32 => Self::NullableUint32,
            Self::Uint64 | Self::NullableUint64 => Self::NullableUint64,
            Self::Float32 | Self::NullableFloat32 => Self::NullableFloat32,
            Self::Float64 | Self::NullableFloat64 => Self::NullableFloat64,
            Self::String | Self::NullableString => Self::NullableString,
            Self::Bool | Self::NullableBool => Self::NullableBool,
            Self::Time | Self::NullableTime => Self::NullableTime,
            Self::Json | Self::NullableJson => Self::NullableJson,
            Self::Enum | Self::NullableEnum => Self::NullableEnum,
            Self::Unknown => panic!("unsupported vector type: unknown field type"),
        }
    }

    /// Returns the non-nullable counterpart of this type (identity for non-nullable types).
    ///
    /// # Panics
    ///
    /// Panics on [`FieldType::Unknown`].
    #[must_use]
    pub const fn non_nullable_type(self) -> FieldType {
        match self {
            Self::Int8 | Self::NullableInt8 => Self::Int8,
            Self::Int16 | Self::NullableInt16 => Self::Int16,
            Self::Int32 | Self::NullableInt32 => Self::Int32,
            Self::Int64 | Self::NullableInt64 => Self::Int64,
            Self::Uint8 | Self::NullableUint8 => Self::Uint8,
            Self::Uint16 | Self::NullableUint16 => Self::Uint16,
            Self::Uint32 | Self::NullableUint32 => Self::Uint32,
            Self::Uint64 | Self::NullableUint64 => Self::Uint64,
            Self::Float32 | Self::NullableFloat32 => Self::Float32,
            Self::Float64 | Self::NullableFloat64 => Self::Float64,
            Self::String | Self::NullableString => Self::String,
            Self::Bool | Self::NullableBool => Self::Bool,
            Self::Time | Self::NullableTime => Self::Time,
            Self::Json | Self::NullableJson => Self::Json,
            Self::Enum | Self::NullableEnum => Self::Enum,
            Self::Unknown => panic!("unsupported vector type: unknown field type"),
        }
    }

    /// Returns `true` for integer and float types (nullable or not).
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self.simple_type(), "number")
    }

    /// Returns `true` for `Time` and `NullableTime`.
    #[must_use]
    pub fn is_time(self) -> bool {
        matches!(self, Self::Time | Self::NullableTime)
    }

    /// Returns `true` for the float types.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::Float32 | Self::NullableFloat32 | Self::Float64 | Self::NullableFloat64
        )
    }

    /// The simplified display type written to the schema's `type` key.
    #[must_use]
    pub fn simple_type(self) -> &'static str {
        match self {
            Self::Int8
            | Self::NullableInt8
            | Self::Int16
            | Self::NullableInt16
            | Self::Int32
            | Self::NullableInt32
            | Self::Int64
            | Self::NullableInt64
            | Self::Uint8
            | Self::NullableUint8
            | Self::Uint16
            | Self::NullableUint16
            | Self::Uint32
            | Self::NullableUint32
            | Self::Uint64
            | Self::NullableUint64
            | Self::Float32
            | Self::NullableFloat32
            | Self::Float64
            | Self::NullableFloat64 => "number",
            Self::String | Self::NullableString => "string",
            Self::Bool | Self::NullableBool => "boolean",
            Self::Time | Self::NullableTime => "time",
            Self::Enum | Self::NullableEnum => "enum",
            Self::Json | Self::NullableJson | Self::Unknown => "other",
        }
    }

    /// The canonical item-type name (`"int8"`, `"*int8"`, `"time.Time"`, ...).
    #[must_use]
    pub fn item_type_string(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::NullableInt8 => "*int8",
            Self::Int16 => "int16",
            Self::NullableInt16 => "*int16",
            Self::Int32 => "int32",
            Self::NullableInt32 => "*int32",
            Self::Int64 => "int64",
            Self::NullableInt64 => "*int64",
            Self::Uint8 => "uint8",
            Self::NullableUint8 => "*uint8",
            Self::Uint16 => "uint16",
            Self::NullableUint16 => "*uint16",
            Self::Uint32 => "uint32",
            Self::NullableUint32 => "*uint32",
            Self::Uint64 => "uint64",
            Self::NullableUint64 => "*uint64",
            Self::Float32 => "float32",
            Self::NullableFloat32 => "*float32",
            Self::Float64 => "float64",
            Self::NullableFloat64 => "*float64",
            Self::String => "string",
            Self::NullableString => "*string",
            Self::Bool => "bool",
            Self::NullableBool => "*bool",
            Self::Time => "time.Time",
            Self::NullableTime => "*time.Time",
            Self::Json => "json.RawMessage",
            Self::NullableJson => "*json.RawMessage",
            Self::Enum => "enum",
            Self::NullableEnum => "*enum",
            Self::Unknown => "invalid/unsupported",
        }
    }

    /// Parses a canonical item-type name.
    ///
    /// The schema's `typeInfo` carries the nullability separately, so the
    /// non-pointer name plus `nullable: true` and the `*`-prefixed name are
    /// both accepted.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownFieldTypeName`] for unrecognized names.
    pub fn from_item_type_string(name: &str) -> FrameResult<FieldType> {
        let (base, nullable) = match name.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (name, false),
        };
        let ft = match base {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "bool" => Self::Bool,
            "time.Time" => Self::Time,
            "json.RawMessage" => Self::Json,
            "enum" => Self::Enum,
            _ => return Err(FrameError::UnknownFieldTypeName(name.to_string())),
        };
        Ok(if nullable { ft.nullable_type() } else { ft })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.item_type_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_counterparts_are_total() {
        for &ft in FieldType::all() {
            let n = ft.nullable_type();
            let nn = ft.non_nullable_type();
            assert!(n.is_nullable(), "{ft}");
            assert!(!nn.is_nullable(), "{ft}");
            assert_eq!(n.non_nullable_type(), nn);
            assert_eq!(nn.nullable_type(), n);
        }
    }

    #[test]
    #[should_panic(expected = "unknown field type")]
    fn test_unknown_has_no_nullable_type() {
        let _ = FieldType::Unknown.nullable_type();
    }

    #[test]
    fn test_item_type_string_is_bijective() {
        for &ft in FieldType::all() {
            let name = ft.item_type_string();
            assert_eq!(FieldType::from_item_type_string(name).unwrap(), ft);
        }
        assert_eq!(FieldType::NullableTime.item_type_string(), "*time.Time");
        assert_eq!(FieldType::Json.item_type_string(), "json.RawMessage");
    }

    #[test]
    fn test_unknown_item_type_string_fails() {
        let err = FieldType::from_item_type_string("int128").unwrap_err();
        assert!(matches!(err, FrameError::UnknownFieldTypeName(ref n) if n == "int128"));
        assert!(FieldType::from_item_type_string("").is_err());
        assert!(FieldType::from_item_type_string("*").is_err());
    }

    #[test]
    fn test_simple_types() {
        assert_eq!(FieldType::NullableUint64.simple_type(), "number");
        assert_eq!(FieldType::Float32.simple_type(), "number");
        assert_eq!(FieldType::String.simple_type(), "string");
        assert_eq!(FieldType::NullableBool.simple_type(), "boolean");
        assert_eq!(FieldType::Time.simple_type(), "time");
        assert_eq!(FieldType::Enum.simple_type(), "enum");
        assert_eq!(FieldType::Json.simple_type(), "other");
    }

    #[test]
    fn test_predicates() {
        assert!(FieldType::Int8.is_numeric());
        assert!(!FieldType::Enum.is_numeric());
        assert!(FieldType::NullableTime.is_time());
        assert!(FieldType::NullableFloat64.is_float());
        assert!(!FieldType::Int64.is_float());
        assert_eq!(FieldType::all().len(), 30);
    }
}
