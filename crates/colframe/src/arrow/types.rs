//! `FieldType` ↔ Arrow `DataType` mapping.

use std::collections::HashMap;

use arrow_schema::{DataType, TimeUnit};

use super::{FIELD_TYPE_KEY, TYPE_ENUM};
use crate::error::{FrameError, FrameResult};
use crate::types::FieldType;

/// The Arrow type storing `ft`.
///
/// Nullability is carried by the Arrow field, not the data type. Enums are
/// `UInt16` columns tagged with field metadata `type=enum`.
///
/// # Panics
///
/// Panics on [`FieldType::Unknown`].
#[must_use]
pub fn field_type_to_arrow(ft: FieldType) -> DataType {
    match ft {
        FieldType::Int8 | FieldType::NullableInt8 => DataType::Int8,
        FieldType::Int16 | FieldType::NullableInt16 => DataType::Int16,
        FieldType::Int32 | FieldType::NullableInt32 => DataType::Int32,
        FieldType::Int64 | FieldType::NullableInt64 => DataType::Int64,
        FieldType::Uint8 | FieldType::NullableUint8 => DataType::UInt8,
        FieldType::Uint16
        | FieldType::NullableUint16
        | FieldType::Enum
        | FieldType::NullableEnum => DataType::UInt16,
        FieldType::Uint32 | FieldType::NullableUint32 => DataType::UInt32,
        FieldType::Uint64 | FieldType::NullableUint64 => DataType::UInt64,
        FieldType::Float32 | FieldType::NullableFloat32 => DataType::Float32,
        FieldType::Float64 | FieldType::NullableFloat64 => DataType::Float64,
        FieldType::String | FieldType::NullableString => DataType::Utf8,
        FieldType::Bool | FieldType::NullableBool => DataType::Boolean,
        FieldType::Time | FieldType::NullableTime => {
            DataType::Timestamp(TimeUnit::Nanosecond, None)
        }
        FieldType::Json | FieldType::NullableJson => DataType::Binary,
        FieldType::Unknown => panic!("unsupported vector type: unknown field type"),
    }
}

/// The field type for an Arrow column.
///
/// All timestamp units and time zones map to `Time`; large string and
/// binary variants are accepted alongside the regular ones.
///
/// # Errors
///
/// Returns [`FrameError::UnsupportedArrowType`] for types with no mapping.
pub fn arrow_to_field_type(
    data_type: &DataType,
    nullable: bool,
    metadata: &HashMap<String, String>,
) -> FrameResult<FieldType> {
    let is_enum = metadata.get(FIELD_TYPE_KEY).is_some_and(|t| t == TYPE_ENUM);
    let ft = match data_type {
        DataType::Int8 => FieldType::Int8,
        DataType::Int16 => FieldType::Int16,
        DataType::Int32 => FieldType::Int32,
        DataType::Int64 => FieldType::Int64,
        DataType::UInt8 => FieldType::Uint8,
        DataType::UInt16 if is_enum => FieldType::Enum,
        DataType::UInt16 => FieldType::Uint16,
        DataType::UInt32 => FieldType::Uint32,
        DataType::UInt64 => FieldType::Uint64,
        DataType::Float32 => FieldType::Float32,
        DataType::Float64 => FieldType::Float64,
        DataType::Utf8 | DataType::LargeUtf8 => FieldType::String,
        DataType::Boolean => FieldType::Bool,
        DataType::Timestamp(_, _) => FieldType::Time,
        DataType::Binary | DataType::LargeBinary => FieldType::Json,
        other => return Err(FrameError::UnsupportedArrowType(other.to_string())),
    };
    Ok(if nullable { ft.nullable_type() } else { ft })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_type_maps_back() {
        for &ft in FieldType::all() {
            let mut metadata = HashMap::new();
            if matches!(ft, FieldType::Enum | FieldType::NullableEnum) {
                metadata.insert(FIELD_TYPE_KEY.to_string(), TYPE_ENUM.to_string());
            }
            let dt = field_type_to_arrow(ft);
            assert_eq!(
                arrow_to_field_type(&dt, ft.is_nullable(), &metadata).unwrap(),
                ft,
                "{ft}"
            );
        }
    }

    #[test]
    fn test_time_and_json_types() {
        assert_eq!(
            field_type_to_arrow(FieldType::NullableTime),
            DataType::Timestamp(TimeUnit::Nanosecond, None)
        );
        assert_eq!(field_type_to_arrow(FieldType::Json), DataType::Binary);
        assert_eq!(
            arrow_to_field_type(
                &DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
                false,
                &HashMap::new()
            )
            .unwrap(),
            FieldType::Time
        );
    }

    #[test]
    fn test_unsupported_arrow_type() {
        let err = arrow_to_field_type(&DataType::Date32, false, &HashMap::new()).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedArrowType(_)));
    }
}
