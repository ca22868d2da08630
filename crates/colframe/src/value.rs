//! Dynamically-typed values.
//!
//! [`Value`] carries one variant per [`FieldType`], so the type of any value
//! handed to a frame can be determined without inspecting the frame. Nullable
//! variants wrap an `Option`; the untyped [`Value::Null`] is only accepted by
//! nullable vectors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::value::RawValue;

use crate::error::{FrameError, FrameResult};
use crate::types::FieldType;

/// Raw, already-encoded JSON text stored in a `json.RawMessage` field.
///
/// The text is embedded verbatim into the wire format, never quoted.
///
/// In a nullable field the JSON literal `null` and a missing value share one
/// wire form, so `Some(RawJson("null"))` decodes as `None`. Dense fields keep
/// it as `RawJson("null")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawJson(String);

impl RawJson {
    /// Validates and wraps a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Json`] if `text` is not valid JSON.
    pub fn new(text: impl Into<String>) -> FrameResult<Self> {
        let text = text.into();
        serde_json::from_str::<serde::de::IgnoredAny>(&text)?;
        Ok(Self(text))
    }

    /// Serializes a `serde_json::Value` into raw JSON text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self(value.to_string())
    }

    pub(crate) fn from_raw(raw: &RawValue) -> Self {
        Self(raw.get().to_string())
    }

    /// The raw JSON text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the raw text into a `serde_json::Value`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Json`] if the stored text is not valid JSON.
    pub fn to_json(&self) -> FrameResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl Default for RawJson {
    fn default() -> Self {
        Self("null".to_string())
    }
}

impl fmt::Display for RawJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index into a field's enum value list (`config.type.enum.text`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumItemIndex(pub u16);

impl From<u16> for EnumItemIndex {
    fn from(idx: u16) -> Self {
        Self(idx)
    }
}

/// A single dynamically-typed cell value.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    Int8(i8),
    NullableInt8(Option<i8>),
    Int16(i16),
    NullableInt16(Option<i16>),
    Int32(i32),
    NullableInt32(Option<i32>),
    Int64(i64),
    NullableInt64(Option<i64>),
    Uint8(u8),
    NullableUint8(Option<u8>),
    Uint16(u16),
    NullableUint16(Option<u16>),
    Uint32(u32),
    NullableUint32(Option<u32>),
    Uint64(u64),
    NullableUint64(Option<u64>),
    Float32(f32),
    NullableFloat32(Option<f32>),
    Float64(f64),
    NullableFloat64(Option<f64>),
    String(String),
    NullableString(Option<String>),
    Bool(bool),
    NullableBool(Option<bool>),
    Time(DateTime<Utc>),
    NullableTime(Option<DateTime<Utc>>),
    Json(RawJson),
    NullableJson(Option<RawJson>),
    Enum(EnumItemIndex),
    NullableEnum(Option<EnumItemIndex>),
    /// An untyped null, legal only for nullable fields.
    Null,
}

/// Expands `$m!` with the `(rust type, non-nullable tag, nullable tag)` list.
macro_rules! for_each_primitive {
    ($m:ident) => {
        $m! {
            (i8, Int8, NullableInt8),
            (i16, Int16, NullableInt16),
            (i32, Int32, NullableInt32),
            (i64, Int64, NullableInt64),
            (u8, Uint8, NullableUint8),
            (u16, Uint16, NullableUint16),
            (u32, Uint32, NullableUint32),
            (u64, Uint64, NullableUint64),
            (f32, Float32, NullableFloat32),
            (f64, Float64, NullableFloat64),
            (String, String, NullableString),
            (bool, Bool, NullableBool),
            (DateTime<Utc>, Time, NullableTime),
            (RawJson, Json, NullableJson),
            (EnumItemIndex, Enum, NullableEnum)
        }
    };
}
pub(crate) use for_each_primitive;

macro_rules! impl_value_conversions {
    ($(($t:ty, $base:ident, $nullable:ident)),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$base(v)
                }
            }

            impl From<Option<$t>> for Value {
                fn from(v: Option<$t>) -> Self {
                    Value::$nullable(v)
                }
            }
        )*

        impl Value {
            /// The field type this value belongs to; `None` for [`Value::Null`].
            #[must_use]
            pub fn field_type(&self) -> Option<FieldType> {
                match self {
                    $(
                        Value::$base(_) => Some(FieldType::$base),
                        Value::$nullable(_) => Some(FieldType::$nullable),
                    )*
                    Value::Null => None,
                }
            }

            /// Returns `true` for [`Value::Null`] and empty nullable variants.
            #[must_use]
            pub fn is_null(&self) -> bool {
                match self {
                    $( Value::$nullable(v) => v.is_none(), )*
                    Value::Null => true,
                    _ => false,
                }
            }

            /// Unwraps a nullable variant into its non-nullable form.
            ///
            /// Returns `None` for nulls; non-nullable variants are returned as is.
            #[must_use]
            pub fn into_concrete(self) -> Option<Value> {
                match self {
                    $( Value::$nullable(v) => v.map(Value::$base), )*
                    Value::Null => None,
                    other => Some(other),
                }
            }

            /// Wraps a non-nullable variant into its nullable form.
            ///
            /// Nullable variants are returned unchanged; [`Value::Null`] stays untyped.
            #[must_use]
            pub fn into_nullable(self) -> Value {
                match self {
                    $( Value::$base(v) => Value::$nullable(Some(v)), )*
                    other => other,
                }
            }
        }
    };
}

for_each_primitive!(impl_value_conversions);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl Value {
    /// Describes the value's type for error messages (`"*int64"`, `"null"`).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.field_type().map_or("null", FieldType::item_type_string)
    }
}

impl FieldType {
    /// Returns the field type for a runtime value.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnsupportedFieldType`] for an untyped null, which
    /// cannot determine a field type on its own.
    pub fn for_value(value: &Value) -> FrameResult<FieldType> {
        value
            .field_type()
            .ok_or_else(|| FrameError::UnsupportedFieldType("untyped null".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_for_value() {
        assert_eq!(
            FieldType::for_value(&Value::from(5i8)).unwrap(),
            FieldType::Int8
        );
        assert_eq!(
            FieldType::for_value(&Value::from(Some(5u64))).unwrap(),
            FieldType::NullableUint64
        );
        assert_eq!(
            FieldType::for_value(&Value::from(None::<DateTime<Utc>>)).unwrap(),
            FieldType::NullableTime
        );
        assert_eq!(
            FieldType::for_value(&Value::from(EnumItemIndex(3))).unwrap(),
            FieldType::Enum
        );
        assert!(matches!(
            FieldType::for_value(&Value::Null),
            Err(FrameError::UnsupportedFieldType(_))
        ));
    }

    #[test]
    fn test_concrete_and_nullable_conversions() {
        assert_eq!(
            Value::from(Some(2.5f64)).into_concrete(),
            Some(Value::Float64(2.5))
        );
        assert_eq!(Value::NullableBool(None).into_concrete(), None);
        assert_eq!(Value::Null.into_concrete(), None);
        assert_eq!(
            Value::from("a").into_nullable(),
            Value::NullableString(Some("a".into()))
        );
        assert!(Value::NullableInt32(None).is_null());
        assert!(!Value::Int32(0).is_null());
    }

    #[test]
    fn test_raw_json_validation() {
        let raw = RawJson::new(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(raw.as_str(), r#"{"a": [1, 2]}"#);
        assert_eq!(raw.to_json().unwrap()["a"][1], 2);
        assert!(RawJson::new("{not json").is_err());
        assert_eq!(RawJson::default().as_str(), "null");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::NullableInt64(Some(1)).type_name(), "*int64");
    }
}
