//! Per-element Arrow builders and readers.
//!
//! Each element type names the builder that accumulates its values plus a
//! validity bitmap, and knows how to read itself back out of an Arrow
//! array. Dense and nullable vectors share one implementation.

use arrow_array::builder::{
    ArrayBuilder, BinaryBuilder, BooleanBuilder, PrimitiveBuilder, StringBuilder,
    TimestampNanosecondBuilder, UInt16Builder,
};
use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow_array::{Array, ArrayRef};
use arrow_schema::{DataType, TimeUnit};
use chrono::{DateTime, Utc};

use crate::error::{FrameError, FrameResult};
use crate::types::FieldType;
use crate::value::{for_each_primitive, EnumItemIndex, RawJson};
use crate::vector::Vector;

/// An element type with an Arrow column representation.
pub(crate) trait ArrowElement: Sized {
    type Builder: ArrayBuilder;

    fn builder(capacity: usize) -> Self::Builder;

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()>;

    fn append_null(builder: &mut Self::Builder);

    /// Reads every slot of `array`, `None` for nulls.
    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>>;
}

fn type_mismatch(array: &dyn Array, expected: &str) -> FrameError {
    FrameError::UnsupportedArrowType(format!(
        "{} column where {expected} was expected",
        array.data_type()
    ))
}

macro_rules! impl_arrow_primitive {
    ($($t:ty => $arrow:ty),* $(,)?) => {
        $(
            impl ArrowElement for $t {
                type Builder = PrimitiveBuilder<$arrow>;

                fn builder(capacity: usize) -> Self::Builder {
                    PrimitiveBuilder::with_capacity(capacity)
                }

                fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
                    builder.append_value(*value);
                    Ok(())
                }

                fn append_null(builder: &mut Self::Builder) {
                    builder.append_null();
                }

                fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
                    let typed = array
                        .as_primitive_opt::<$arrow>()
                        .ok_or_else(|| type_mismatch(array, stringify!($t)))?;
                    Ok(typed.iter().collect())
                }
            }
        )*
    };
}

impl_arrow_primitive!(
    i8 => Int8Type,
    i16 => Int16Type,
    i32 => Int32Type,
    i64 => Int64Type,
    u8 => UInt8Type,
    u16 => UInt16Type,
    u32 => UInt32Type,
    u64 => UInt64Type,
    f32 => Float32Type,
    f64 => Float64Type,
);

impl ArrowElement for bool {
    type Builder = BooleanBuilder;

    fn builder(capacity: usize) -> Self::Builder {
        BooleanBuilder::with_capacity(capacity)
    }

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
        builder.append_value(*value);
        Ok(())
    }

    fn append_null(builder: &mut Self::Builder) {
        builder.append_null();
    }

    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
        let typed = array
            .as_boolean_opt()
            .ok_or_else(|| type_mismatch(array, "bool"))?;
        Ok(typed.iter().collect())
    }
}

impl ArrowElement for String {
    type Builder = StringBuilder;

    fn builder(capacity: usize) -> Self::Builder {
        StringBuilder::with_capacity(capacity, capacity * 16)
    }

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
        builder.append_value(value);
        Ok(())
    }

    fn append_null(builder: &mut Self::Builder) {
        builder.append_null();
    }

    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
        let values: Option<Vec<Option<String>>> = match array.data_type() {
            DataType::Utf8 => array.as_string_opt::<i32>().map(|a| {
                a.iter().map(|v| v.map(str::to_string)).collect()
            }),
            DataType::LargeUtf8 => array.as_string_opt::<i64>().map(|a| {
                a.iter().map(|v| v.map(str::to_string)).collect()
            }),
            _ => None,
        };
        values.ok_or_else(|| type_mismatch(array, "string"))
    }
}

impl ArrowElement for DateTime<Utc> {
    type Builder = TimestampNanosecondBuilder;

    fn builder(capacity: usize) -> Self::Builder {
        TimestampNanosecondBuilder::with_capacity(capacity)
    }

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
        let ns = value
            .timestamp_nanos_opt()
            .ok_or_else(|| FrameError::TimeOutOfRange(value.to_rfc3339()))?;
        builder.append_value(ns);
        Ok(())
    }

    fn append_null(builder: &mut Self::Builder) {
        builder.append_null();
    }

    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
        let DataType::Timestamp(unit, _) = array.data_type() else {
            return Err(type_mismatch(array, "timestamp"));
        };
        let unit = *unit;
        let raw: Option<Vec<Option<i64>>> = match unit {
            TimeUnit::Second => array
                .as_primitive_opt::<TimestampSecondType>()
                .map(|a| a.iter().collect()),
            TimeUnit::Millisecond => array
                .as_primitive_opt::<TimestampMillisecondType>()
                .map(|a| a.iter().collect()),
            TimeUnit::Microsecond => array
                .as_primitive_opt::<TimestampMicrosecondType>()
                .map(|a| a.iter().collect()),
            TimeUnit::Nanosecond => array
                .as_primitive_opt::<TimestampNanosecondType>()
                .map(|a| a.iter().collect()),
        };
        raw.ok_or_else(|| type_mismatch(array, "timestamp"))?
            .into_iter()
            .map(|v| v.map(|v| timestamp_to_time(v, unit)).transpose())
            .collect()
    }
}

/// Converts an Arrow timestamp in `unit` to a time.
pub(crate) fn timestamp_to_time(v: i64, unit: TimeUnit) -> FrameResult<DateTime<Utc>> {
    let t = match unit {
        TimeUnit::Second => DateTime::from_timestamp(v, 0),
        TimeUnit::Millisecond => DateTime::from_timestamp_millis(v),
        TimeUnit::Microsecond => DateTime::from_timestamp_micros(v),
        TimeUnit::Nanosecond => Some(DateTime::from_timestamp_nanos(v)),
    };
    t.ok_or_else(|| FrameError::TimeOutOfRange(format!("{v} ({unit:?})")))
}

impl ArrowElement for RawJson {
    type Builder = BinaryBuilder;

    fn builder(capacity: usize) -> Self::Builder {
        BinaryBuilder::with_capacity(capacity, capacity * 16)
    }

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
        builder.append_value(value.as_str().as_bytes());
        Ok(())
    }

    fn append_null(builder: &mut Self::Builder) {
        builder.append_null();
    }

    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
        let bytes: Vec<Option<&[u8]>> = match array.data_type() {
            DataType::Binary => array
                .as_binary_opt::<i32>()
                .map(|a| a.iter().collect())
                .ok_or_else(|| type_mismatch(array, "binary"))?,
            DataType::LargeBinary => array
                .as_binary_opt::<i64>()
                .map(|a| a.iter().collect())
                .ok_or_else(|| type_mismatch(array, "binary"))?,
            _ => return Err(type_mismatch(array, "binary")),
        };
        bytes
            .into_iter()
            .map(|v| v.map(raw_json_from_bytes).transpose())
            .collect()
    }
}

pub(crate) fn raw_json_from_bytes(bytes: &[u8]) -> FrameResult<RawJson> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| FrameError::malformed(format!("json column is not utf-8: {e}")))?;
    RawJson::new(text)
}

impl ArrowElement for EnumItemIndex {
    type Builder = UInt16Builder;

    fn builder(capacity: usize) -> Self::Builder {
        UInt16Builder::with_capacity(capacity)
    }

    fn append(builder: &mut Self::Builder, value: &Self) -> FrameResult<()> {
        builder.append_value(value.0);
        Ok(())
    }

    fn append_null(builder: &mut Self::Builder) {
        builder.append_null();
    }

    fn read(array: &dyn Array) -> FrameResult<Vec<Option<Self>>> {
        Ok(u16::read(array)?
            .into_iter()
            .map(|v| v.map(EnumItemIndex))
            .collect())
    }
}

// ── Vector ↔ array ─────────────────────────────────────────────────

fn dense_array<T: ArrowElement>(values: &[T]) -> FrameResult<ArrayRef> {
    let mut builder = T::builder(values.len());
    for v in values {
        T::append(&mut builder, v)?;
    }
    Ok(ArrayBuilder::finish(&mut builder))
}

fn nullable_array<T: ArrowElement>(values: &[Option<T>]) -> FrameResult<ArrayRef> {
    let mut builder = T::builder(values.len());
    for v in values {
        match v {
            Some(v) => T::append(&mut builder, v)?,
            None => T::append_null(&mut builder),
        }
    }
    Ok(ArrayBuilder::finish(&mut builder))
}

fn read_nullable<T: ArrowElement>(arrays: &[&dyn Array]) -> FrameResult<Vec<Option<T>>> {
    let mut out = Vec::with_capacity(arrays.iter().map(|a| a.len()).sum());
    for array in arrays {
        out.extend(T::read(*array)?);
    }
    Ok(out)
}

fn read_dense<T: ArrowElement>(arrays: &[&dyn Array]) -> FrameResult<Vec<T>> {
    read_nullable::<T>(arrays)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                FrameError::malformed(format!("null at row {row} of a non-nullable arrow column"))
            })
        })
        .collect()
}

macro_rules! impl_vector_arrays {
    ($(($t:ty, $base:ident, $nullable:ident)),* $(,)?) => {
        /// Builds the Arrow array for a vector.
        pub(crate) fn vector_to_array(vector: &Vector) -> FrameResult<ArrayRef> {
            match vector {
                $(
                    Vector::$base(v) => dense_array::<$t>(v.as_slice()),
                    Vector::$nullable(v) => nullable_array::<$t>(v.as_slice()),
                )*
            }
        }

        /// Reads a vector of type `ft` from the concatenation of `arrays`.
        pub(crate) fn arrays_to_vector(ft: FieldType, arrays: &[&dyn Array]) -> FrameResult<Vector> {
            Ok(match ft {
                $(
                    FieldType::$base => Vector::from(read_dense::<$t>(arrays)?),
                    FieldType::$nullable => Vector::from(read_nullable::<$t>(arrays)?),
                )*
                FieldType::Unknown => {
                    return Err(FrameError::UnsupportedFieldType(ft.item_type_string().into()))
                }
            })
        }
    };
}

for_each_primitive!(impl_vector_arrays);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_array_validity() {
        let array = nullable_array(&[Some(1i32), None, Some(3)]).unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array.null_count(), 1);
        assert!(array.is_null(1));
    }

    #[test]
    fn test_time_round_trip_through_nanos() {
        let t = DateTime::from_timestamp(1_600_000_000, 123_456_789).unwrap();
        let array = dense_array(&[t]).unwrap();
        assert_eq!(
            array.data_type(),
            &DataType::Timestamp(TimeUnit::Nanosecond, None)
        );
        let back = read_dense::<DateTime<Utc>>(&[array.as_ref()]).unwrap();
        assert_eq!(back, vec![t]);
    }

    #[test]
    fn test_read_millisecond_timestamps() {
        let array = arrow_array::TimestampMillisecondArray::from(vec![Some(1_500), None]);
        let back = read_nullable::<DateTime<Utc>>(&[&array]).unwrap();
        assert_eq!(back[0], DateTime::from_timestamp_millis(1_500));
        assert_eq!(back[1], None);
    }

    #[test]
    fn test_dense_rejects_nulls() {
        let array = arrow_array::Int64Array::from(vec![Some(1), None]);
        assert!(read_dense::<i64>(&[&array]).is_err());
    }

    #[test]
    fn test_json_column_validated() {
        let array = arrow_array::BinaryArray::from(vec![b"{\"a\":1}".as_ref(), b"{bad".as_ref()]);
        assert!(read_nullable::<RawJson>(&[&array]).is_err());
    }

    #[test]
    fn test_concatenates_arrays() {
        let a = arrow_array::UInt64Array::from(vec![u64::MAX]);
        let b = arrow_array::UInt64Array::from(vec![1]);
        let v = arrays_to_vector(FieldType::Uint64, &[&a, &b]).unwrap();
        assert_eq!(v.as_typed::<u64>().unwrap().as_slice(), &[u64::MAX, 1]);
    }
}
