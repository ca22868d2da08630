//! JSON wire format → Frame.
//!
//! The envelope is parsed with `serde` into borrowed [`RawValue`]s, then each
//! `values` array is decoded straight into the typed storage its schema
//! declares. Unsigned 64-bit values never pass through `f64`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use tracing::{debug, warn};

use super::side::{time_from_wire, ColumnSideIn, EntityLookup};
use crate::error::{FrameError, FrameResult};
use crate::field::{Field, Labels};
use crate::frame::Frame;
use crate::meta::{FieldConfig, FrameMeta};
use crate::types::FieldType;
use crate::value::{for_each_primitive, EnumItemIndex, RawJson};
use crate::vector::{Element, Vector};

// ── Envelope ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct WireFrame<'a> {
    #[serde(default)]
    pub(crate) schema: Option<WireSchema>,
    #[serde(borrow, default)]
    pub(crate) data: Option<WireData<'a>>,
}

/// Parses one frame object. Any JSON that does not have the envelope's
/// shape is reported as malformed wire data.
pub(crate) fn parse_frame(json: &str) -> FrameResult<WireFrame<'_>> {
    serde_json::from_str(json).map_err(|e| FrameError::malformed(format!("frame: {e}")))
}

/// Parses a JSON array of frame objects without decoding their contents.
pub(crate) fn parse_frame_list(json: &str) -> FrameResult<Vec<&RawValue>> {
    serde_json::from_str(json).map_err(|e| FrameError::malformed(format!("frame list: {e}")))
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSchema {
    #[serde(default)]
    name: String,
    #[serde(rename = "refId", default)]
    ref_id: String,
    #[serde(default)]
    meta: Option<FrameMeta>,
    #[serde(default)]
    fields: Vec<WireField>,
}

#[derive(Debug, Deserialize)]
struct WireField {
    #[serde(default)]
    name: String,
    #[serde(rename = "typeInfo", default)]
    type_info: WireTypeInfo,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    config: Option<FieldConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTypeInfo {
    #[serde(default)]
    frame: String,
    #[serde(default)]
    nullable: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireData<'a> {
    #[serde(borrow)]
    values: Vec<&'a RawValue>,
    #[serde(default)]
    entities: Option<Vec<Option<EntityLookup>>>,
    #[serde(default)]
    nanos: Option<Vec<Option<Vec<i64>>>>,
}

/// A `u64` written either as a JSON integer or as a decimal string.
struct WireU64(u64);

impl<'de> Deserialize<'de> for WireU64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct U64Visitor;

        impl Visitor<'_> for U64Visitor {
            type Value = WireU64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned 64-bit integer or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireU64, E> {
                Ok(WireU64(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireU64, E> {
                u64::try_from(v)
                    .map(WireU64)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WireU64, E> {
                v.parse()
                    .map(WireU64)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(U64Visitor)
    }
}

// ── Element decoding ───────────────────────────────────────────────

/// An element type's inline JSON decoding.
trait WireDecode: Sized {
    type Wire: DeserializeOwned;

    fn from_wire(wire: Self::Wire, row: usize, side: &ColumnSideIn<'_>) -> FrameResult<Self>;

    /// A `null` slot in a non-nullable field.
    fn null_dense(row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        Err(FrameError::malformed(format!(
            "unexpected null at row {row} of a non-nullable field"
        )))
    }

    /// A `null` slot in a nullable field.
    fn null_nullable(_row: usize, _side: &ColumnSideIn<'_>) -> Option<Self> {
        None
    }
}

macro_rules! impl_wire_decode_plain {
    ($($t:ty),* $(,)?) => {
        $(
            impl WireDecode for $t {
                type Wire = $t;

                fn from_wire(wire: $t, _row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
                    Ok(wire)
                }
            }
        )*
    };
}

impl_wire_decode_plain!(i8, i16, i32, i64, u8, u16, u32, String, bool);

impl WireDecode for u64 {
    type Wire = WireU64;

    fn from_wire(wire: WireU64, _row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        Ok(wire.0)
    }
}

macro_rules! impl_wire_decode_float {
    ($($t:ty => $special:ident),* $(,)?) => {
        $(
            impl WireDecode for $t {
                type Wire = $t;

                fn from_wire(wire: $t, row: usize, side: &ColumnSideIn<'_>) -> FrameResult<Self> {
                    Ok(side.special(row).map_or(wire, |s| s.$special()))
                }

                fn null_dense(row: usize, side: &ColumnSideIn<'_>) -> FrameResult<Self> {
                    side.special(row).map(|s| s.$special()).ok_or_else(|| {
                        warn!(row, "null in non-nullable float field without an entity");
                        FrameError::malformed(format!(
                            "null at row {row} of a non-nullable float field has no entity"
                        ))
                    })
                }

                fn null_nullable(row: usize, side: &ColumnSideIn<'_>) -> Option<Self> {
                    side.special(row).map(|s| s.$special())
                }
            }
        )*
    };
}

impl_wire_decode_float!(f32 => as_f32, f64 => as_f64);

impl WireDecode for DateTime<Utc> {
    type Wire = i64;

    fn from_wire(millis: i64, row: usize, side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        time_from_wire(millis, side.nanos(row))
    }
}

impl WireDecode for RawJson {
    type Wire = Box<RawValue>;

    fn from_wire(wire: Box<RawValue>, _row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        Ok(RawJson::from_raw(&wire))
    }

    fn null_dense(_row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        Ok(RawJson::default())
    }
}

impl WireDecode for EnumItemIndex {
    type Wire = u16;

    fn from_wire(wire: u16, _row: usize, _side: &ColumnSideIn<'_>) -> FrameResult<Self> {
        Ok(EnumItemIndex(wire))
    }
}

fn parse_column<W: DeserializeOwned>(raw: &RawValue) -> FrameResult<Vec<Option<W>>> {
    Ok(serde_json::from_str(raw.get())?)
}

fn decode_dense<T: WireDecode>(wire: Vec<Option<T::Wire>>, side: &ColumnSideIn<'_>) -> FrameResult<Vec<T>> {
    wire.into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(v) => T::from_wire(v, row, side),
            None => T::null_dense(row, side),
        })
        .collect()
}

fn decode_nullable<T: WireDecode>(
    wire: Vec<Option<T::Wire>>,
    side: &ColumnSideIn<'_>,
) -> FrameResult<Vec<Option<T>>> {
    wire.into_iter()
        .enumerate()
        .map(|(row, v)| match v {
            Some(v) => T::from_wire(v, row, side).map(Some),
            None => Ok(T::null_nullable(row, side)),
        })
        .collect()
}

/// Inputs for decoding one column.
struct ColumnInput<'a> {
    field_idx: usize,
    raw: &'a RawValue,
    entities: Option<EntityLookup>,
    nanos: Option<&'a [i64]>,
}

impl ColumnInput<'_> {
    fn decode<T>(self, nullable: bool) -> FrameResult<Vector>
    where
        T: WireDecode + Element,
        Option<T>: Element,
    {
        let wire = parse_column::<T::Wire>(self.raw).map_err(|e| match e {
            FrameError::Json(e) => {
                FrameError::malformed(format!("values for field {}: {e}", self.field_idx))
            }
            other => other,
        })?;
        let side = ColumnSideIn::new(self.field_idx, wire.len(), self.entities, self.nanos)?;
        Ok(if nullable {
            Vector::from(decode_nullable::<T>(wire, &side)?)
        } else {
            Vector::from(decode_dense::<T>(wire, &side)?)
        })
    }
}

macro_rules! impl_decode_vector {
    ($(($t:ty, $base:ident, $nullable:ident)),* $(,)?) => {
        fn decode_vector(ft: FieldType, input: ColumnInput<'_>) -> FrameResult<Vector> {
            match ft {
                $(
                    FieldType::$base => input.decode::<$t>(false),
                    FieldType::$nullable => input.decode::<$t>(true),
                )*
                FieldType::Unknown => Err(FrameError::UnsupportedFieldType(
                    FieldType::Unknown.item_type_string().into(),
                )),
            }
        }
    };
}

for_each_primitive!(impl_decode_vector);

// ── Frame assembly ─────────────────────────────────────────────────

fn field_type_of(info: &WireTypeInfo, strict: bool) -> FrameResult<FieldType> {
    match FieldType::from_item_type_string(&info.frame) {
        Ok(ft) if info.nullable => Ok(ft.nullable_type()),
        Ok(ft) => Ok(ft),
        Err(err) if strict => Err(err),
        Err(_) => {
            debug!(type_name = %info.frame, "unknown type name, decoding as nullable string");
            Ok(FieldType::NullableString)
        }
    }
}

/// Builds the zero-row frame a schema describes.
pub(crate) fn frame_from_schema(schema: WireSchema, strict: bool) -> FrameResult<Frame> {
    let mut fields = Vec::with_capacity(schema.fields.len());
    for wire in schema.fields {
        let ft = field_type_of(&wire.type_info, strict)?;
        let mut field = Field::from_vector(wire.name, Vector::new(ft, 0)).with_labels(wire.labels);
        field.config = wire.config;
        fields.push(field);
    }
    Ok(Frame {
        name: schema.name,
        ref_id: schema.ref_id,
        meta: schema.meta,
        warnings: Vec::new(),
        fields,
    })
}

/// Decodes every column of `data` with the given field types.
pub(crate) fn decode_columns(data: WireData<'_>, types: &[FieldType]) -> FrameResult<Vec<Vector>> {
    let WireData {
        values,
        entities,
        nanos,
    } = data;

    if values.len() != types.len() {
        return Err(FrameError::malformed(format!(
            "data has {} value arrays but the schema has {} fields",
            values.len(),
            types.len()
        )));
    }
    let mut entities = entities.unwrap_or_default();
    if entities.len() > types.len() {
        return Err(FrameError::malformed(format!(
            "entities has {} entries but the schema has {} fields",
            entities.len(),
            types.len()
        )));
    }
    entities.resize_with(types.len(), || None);
    let nanos = nanos.unwrap_or_default();
    if nanos.len() > types.len() {
        return Err(FrameError::malformed(format!(
            "nanos has {} entries but the schema has {} fields",
            nanos.len(),
            types.len()
        )));
    }

    let mut vectors = Vec::with_capacity(types.len());
    for (field_idx, ((raw, ft), lookup)) in values.into_iter().zip(types).zip(entities).enumerate() {
        let input = ColumnInput {
            field_idx,
            raw,
            entities: if ft.is_float() { lookup } else { None },
            nanos: if ft.is_time() {
                nanos.get(field_idx).and_then(Option::as_deref)
            } else {
                None
            },
        };
        vectors.push(decode_vector(*ft, input)?);
    }

    if let Some(first) = vectors.first() {
        let expected = first.len();
        if let Some((idx, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != expected) {
            return Err(FrameError::malformed(format!(
                "field {idx} has {} values but field 0 has {expected}",
                v.len()
            )));
        }
    }
    Ok(vectors)
}

/// Decodes a complete frame object.
pub(crate) fn decode_frame(wire: WireFrame<'_>, strict: bool) -> FrameResult<Frame> {
    let schema = wire
        .schema
        .ok_or_else(|| FrameError::malformed("frame has no schema"))?;
    let mut frame = frame_from_schema(schema, strict)?;
    if let Some(data) = wire.data {
        fill_frame(&mut frame, data)?;
    }
    debug!(
        frame = %frame.name,
        fields = frame.fields.len(),
        rows = frame.rows(),
        "decoded frame"
    );
    Ok(frame)
}

/// Replaces the vectors of `frame` with the decoded `data`.
///
/// `frame` is untouched when decoding fails.
pub(crate) fn fill_frame(frame: &mut Frame, data: WireData<'_>) -> FrameResult<()> {
    let types: Vec<FieldType> = frame.fields.iter().map(Field::field_type).collect();
    let vectors = decode_columns(data, &types)?;
    for (field, vector) in frame.fields.iter_mut().zip(vectors) {
        field.replace_vector(vector);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> FrameResult<Frame> {
        decode_frame(parse_frame(json)?, true)
    }

    #[test]
    fn test_u64_integer_and_string() {
        let frame = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"uint64"}}]},
                "data":{"values":[[18446744073709551615,"18446744073709551614"]]}}"#,
        )
        .unwrap();
        let v = frame.fields[0].typed::<u64>().unwrap();
        assert_eq!(v.as_slice(), &[u64::MAX, u64::MAX - 1]);
    }

    #[test]
    fn test_values_count_mismatch() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"int8"}}]},
                "data":{"values":[[1],[2]]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_unequal_columns_rejected() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"int8"}},{"typeInfo":{"frame":"int8"}}]},
                "data":{"values":[[1,2],[3]]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("field 1 has 1 values but field 0 has 2"));
    }

    #[test]
    fn test_not_an_array() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"int8"}}]},
                "data":{"values":[{"a":1}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(ref m) if m.contains("field 0")));
    }

    #[test]
    fn test_unknown_type_name() {
        let json = r#"{"schema":{"fields":[{"typeInfo":{"frame":"decimal128"}}]},
                       "data":{"values":[["1.5",null]]}}"#;
        let err = decode(json).unwrap_err();
        assert!(matches!(err, FrameError::UnknownFieldTypeName(ref n) if n == "decimal128"));

        let wire: WireFrame<'_> = serde_json::from_str(json).unwrap();
        let frame = decode_frame(wire, false).unwrap();
        assert_eq!(frame.fields[0].field_type(), FieldType::NullableString);
        assert_eq!(frame.fields[0].len(), 2);
    }

    #[test]
    fn test_null_in_non_nullable_float_without_entity() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"float64"}}]},
                "data":{"values":[[1.0,null]]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_null_in_non_nullable_int() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"int32"}}]},
                "data":{"values":[[null]]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_entities_longer_than_fields() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"float64"}}]},
                "data":{"values":[[null]],"entities":[{"NaN":[0]},null]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_raw_json_kept_verbatim() {
        let frame = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"json.RawMessage"}}]},
                "data":{"values":[[{"a":[1,2]},null]]}}"#,
        )
        .unwrap();
        let v = frame.fields[0].typed::<RawJson>().unwrap();
        assert_eq!(v.at(0).as_str(), r#"{"a":[1,2]}"#);
        assert_eq!(v.at(1).as_str(), "null");
    }

    #[test]
    fn test_missing_schema() {
        let err = decode(r#"{"data":{"values":[]}}"#).unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_values_not_an_array() {
        let err = decode(r#"{"schema":{"fields":[]},"data":{"values":5}}"#).unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_truncated_values() {
        let err = decode(
            r#"{"schema":{"fields":[{"typeInfo":{"frame":"int64"}}]},"data":{"values":[[1,2"#,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }

    #[test]
    fn test_frame_list_not_an_array() {
        let err = parse_frame_list(r#"{"schema":{}}"#).unwrap_err();
        assert!(matches!(err, FrameError::MalformedWireData(_)));
    }
}
