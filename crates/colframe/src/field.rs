//! Named, labeled columns.
//!
//! A [`Field`] owns exactly one [`Vector`] whose type is fixed at
//! construction: the vector is private and only reachable through
//! length/value operations that cannot change its element type.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, FrameResult};
use crate::meta::FieldConfig;
use crate::types::FieldType;
use crate::value::Value;
use crate::vector::{Element, TypedVector, Vector};

// ── Labels ─────────────────────────────────────────────────────────

/// String key/value pairs identifying a series, e.g. `{host=a, region=eu}`.
///
/// Keys are kept sorted so the string form is canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    /// Creates an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a label, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Sets a label.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Looks up a label value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if every label in `other` is present here with the same value.
    #[must_use]
    pub fn contains(&self, other: &Labels) -> bool {
        other.0.iter().all(|(k, v)| self.0.get(k) == Some(v))
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

impl FromStr for Labels {
    type Err = FrameError;

    /// Parses `{a=b, c=d}`; the braces are optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        let mut labels = Labels::new();
        for pair in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (k, v) = pair
                .split_once('=')
                .ok_or_else(|| FrameError::InvalidLabels(format!("expected key=value, got '{pair}'")))?;
            let key = k.trim();
            if key.is_empty() {
                return Err(FrameError::InvalidLabels(format!("empty key in '{pair}'")));
            }
            labels.insert(key, v.trim());
        }
        Ok(labels)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ── Field ──────────────────────────────────────────────────────────

/// A named, typed column of a [`Frame`](crate::Frame).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name; may be empty.
    pub name: String,
    /// Series labels.
    pub labels: Labels,
    /// Optional display configuration.
    pub config: Option<FieldConfig>,
    vector: Vector,
}

impl Field {
    /// Creates a field from typed values.
    ///
    /// ```rust
    /// use colframe::{Field, FieldType};
    ///
    /// let f = Field::new("temp", vec![Some(1.5f64), None]);
    /// assert_eq!(f.field_type(), FieldType::NullableFloat64);
    /// ```
    #[must_use]
    pub fn new<T: Element>(name: impl Into<String>, values: Vec<T>) -> Self {
        Self::from_vector(name, Vector::from(values))
    }

    /// Creates a field around an existing vector.
    #[must_use]
    pub fn from_vector(name: impl Into<String>, vector: Vector) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
            config: None,
            vector,
        }
    }

    /// Creates an unnamed field of `len` zero (or null) values of type `ft`.
    ///
    /// # Panics
    ///
    /// Panics on [`FieldType::Unknown`].
    #[must_use]
    pub fn new_from_field_type(ft: FieldType, len: usize) -> Self {
        Self::from_vector("", Vector::new(ft, len))
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the display configuration.
    #[must_use]
    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the display configuration.
    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = Some(config);
    }

    /// The element type of the field.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.vector.field_type()
    }

    /// Returns `true` if the field can hold nulls.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.field_type().is_nullable()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    /// Returns `true` if the field holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Borrows the backing vector.
    #[must_use]
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Borrows the typed values, if the field holds `T`.
    #[must_use]
    pub fn typed<T: Element>(&self) -> Option<&TypedVector<T>> {
        self.vector.as_typed()
    }

    /// Mutably borrows the typed values, if the field holds `T`.
    pub fn typed_mut<T: Element>(&mut self) -> Option<&mut TypedVector<T>> {
        self.vector.as_typed_mut()
    }

    /// See [`Vector::at`].
    #[must_use]
    pub fn at(&self, idx: usize) -> Value {
        self.vector.at(idx)
    }

    /// See [`Vector::copy_at`].
    #[must_use]
    pub fn copy_at(&self, idx: usize) -> Value {
        self.vector.copy_at(idx)
    }

    /// See [`Vector::concrete_at`].
    #[must_use]
    pub fn concrete_at(&self, idx: usize) -> (Value, bool) {
        self.vector.concrete_at(idx)
    }

    /// See [`Vector::set`].
    pub fn set(&mut self, idx: usize, value: Value) {
        self.vector.set(idx, value);
    }

    /// See [`Vector::set_concrete`].
    pub fn set_concrete(&mut self, idx: usize, value: Value) {
        self.vector.set_concrete(idx, value);
    }

    /// See [`Vector::append`].
    pub fn append(&mut self, value: Value) {
        self.vector.append(value);
    }

    /// See [`Vector::extend`].
    pub fn extend(&mut self, n: usize) {
        self.vector.extend(n);
    }

    /// See [`Vector::insert`].
    pub fn insert(&mut self, idx: usize, value: Value) {
        self.vector.insert(idx, value);
    }

    /// See [`Vector::delete`].
    pub fn delete(&mut self, idx: usize) {
        self.vector.delete(idx);
    }

    /// See [`Vector::clear`].
    pub fn clear(&mut self) {
        self.vector.clear();
    }

    /// Swaps in a vector of the same type, returning the old one.
    pub(crate) fn replace_vector(&mut self, vector: Vector) -> Vector {
        debug_assert_eq!(vector.field_type(), self.vector.field_type());
        std::mem::replace(&mut self.vector, vector)
    }

    /// Same name, labels and type, no values and no config.
    #[must_use]
    pub fn empty_copy(&self) -> Field {
        Field {
            name: self.name.clone(),
            labels: self.labels.clone(),
            config: None,
            vector: self.vector.empty_copy(),
        }
    }

    /// The name shown to users: config display name, then the
    /// source-provided display name, then the field name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.config
            .as_ref()
            .and_then(|c| c.display_name.as_deref().or(c.display_name_from_ds.as_deref()))
            .unwrap_or(self.name.as_str())
    }

    /// The value at `idx` as a float.
    ///
    /// Nulls become NaN and times become epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NotNumeric`] for string, bool, JSON and enum fields.
    pub fn float_at(&self, idx: usize) -> FrameResult<f64> {
        Ok(self.nullable_float_at(idx)?.unwrap_or(f64::NAN))
    }

    /// The value at `idx` as a float, `None` for nulls.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NotNumeric`] for string, bool, JSON and enum fields.
    #[allow(clippy::cast_precision_loss)]
    pub fn nullable_float_at(&self, idx: usize) -> FrameResult<Option<f64>> {
        let ft = self.field_type();
        if !ft.is_numeric() && !ft.is_time() {
            return Err(FrameError::NotNumeric(ft));
        }
        let (value, present) = self.vector.concrete_at(idx);
        if !present {
            return Ok(None);
        }
        let f = match value {
            Value::Int8(v) => f64::from(v),
            Value::Int16(v) => f64::from(v),
            Value::Int32(v) => f64::from(v),
            Value::Int64(v) => v as f64,
            Value::Uint8(v) => f64::from(v),
            Value::Uint16(v) => f64::from(v),
            Value::Uint32(v) => f64::from(v),
            Value::Uint64(v) => v as f64,
            Value::Float32(v) => f64::from(v),
            Value::Float64(v) => v,
            Value::Time(t) => t.timestamp_millis() as f64,
            _ => return Err(FrameError::NotNumeric(ft)),
        };
        Ok(Some(f))
    }
}
