//! Frames: ordered collections of equal-length fields.
//!
//! A [`Frame`] is a pure columnar container. The equal-length invariant is
//! validated on demand by [`Frame::row_len`], never eagerly, so producers may
//! violate it temporarily while filling fields one at a time.
//!
//! # Example
//!
//! ```rust
//! use colframe::{Field, Frame, Value};
//!
//! let mut frame = Frame::new("cpu").with_fields(vec![
//!     Field::new("host", Vec::<String>::new()),
//!     Field::new("value", Vec::<Option<f64>>::new()),
//! ]);
//! frame
//!     .append_row_safe(vec![Value::from("a"), Value::NullableFloat64(Some(0.5))])
//!     .unwrap();
//! assert_eq!(frame.row_len().unwrap(), 1);
//! ```

use std::ops::{Deref, DerefMut};

use crate::error::{FrameError, FrameResult};
use crate::field::Field;
use crate::meta::{FrameMeta, Notice, Warning};
use crate::types::FieldType;
use crate::value::Value;

/// A named table of equal-length [`Field`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Frame name; may be empty.
    pub name: String,
    /// Identifier of the query that produced the frame; may be empty.
    pub ref_id: String,
    /// Optional frame metadata.
    pub meta: Option<FrameMeta>,
    /// Producer warnings.
    pub warnings: Vec<Warning>,
    /// Columns, in display order.
    pub fields: Vec<Field>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the ref id.
    #[must_use]
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = ref_id.into();
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: FrameMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Appends a field.
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Adds notices to the frame metadata, creating it if needed.
    pub fn append_notices(&mut self, notices: impl IntoIterator<Item = Notice>) {
        self.meta
            .get_or_insert_with(FrameMeta::default)
            .notices
            .extend(notices);
    }

    /// Adds a producer warning.
    pub fn append_warning(&mut self, message: impl Into<String>, details: impl Into<String>) {
        self.warnings.push(Warning {
            message: message.into(),
            details: details.into(),
        });
    }

    /// Index of the first field named `name`.
    #[must_use]
    pub fn field_index_by_name(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The first field named `name`.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Indices of fields whose type is one of `types`.
    #[must_use]
    pub fn type_indices(&self, types: &[FieldType]) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| types.contains(&f.field_type()))
            .map(|(i, _)| i)
            .collect()
    }

    /// The number of rows.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NoFields`] for a frame without fields, or
    /// [`FrameError::RowLengthMismatch`] naming the first field whose length
    /// differs from field 0.
    pub fn row_len(&self) -> FrameResult<usize> {
        let first = self.fields.first().ok_or(FrameError::NoFields)?;
        let expected = first.len();
        for (field_index, field) in self.fields.iter().enumerate().skip(1) {
            if field.len() != expected {
                return Err(FrameError::RowLengthMismatch {
                    field_index,
                    expected,
                    actual: field.len(),
                });
            }
        }
        Ok(expected)
    }

    /// The number of rows, or 0 when [`row_len`](Self::row_len) fails.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.row_len().unwrap_or(0)
    }

    /// The value at (`field_idx`, `row_idx`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn at(&self, field_idx: usize, row_idx: usize) -> Value {
        self.fields[field_idx].at(row_idx)
    }

    /// An owned copy of the value at (`field_idx`, `row_idx`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn copy_at(&self, field_idx: usize, row_idx: usize) -> Value {
        self.fields[field_idx].copy_at(row_idx)
    }

    /// The concrete value at (`field_idx`, `row_idx`) and whether it was present.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn concrete_at(&self, field_idx: usize, row_idx: usize) -> (Value, bool) {
        self.fields[field_idx].concrete_at(row_idx)
    }

    /// The value at (`field_idx`, `row_idx`) as a float.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NotNumeric`] if the field is not numeric or time.
    pub fn float_at(&self, field_idx: usize, row_idx: usize) -> FrameResult<f64> {
        self.fields[field_idx].float_at(row_idx)
    }

    /// Overwrites the value at (`field_idx`, `row_idx`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range or the type does not match.
    pub fn set(&mut self, field_idx: usize, row_idx: usize, value: Value) {
        self.fields[field_idx].set(row_idx, value);
    }

    /// Stores a concrete value at (`field_idx`, `row_idx`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range or the type does not match.
    pub fn set_concrete(&mut self, field_idx: usize, row_idx: usize, value: Value) {
        self.fields[field_idx].set_concrete(row_idx, value);
    }

    /// Extends every field by `n` zero (or null) rows.
    pub fn extend(&mut self, n: usize) {
        for field in &mut self.fields {
            field.extend(n);
        }
    }

    /// Appends a row without validation.
    ///
    /// # Panics
    ///
    /// Panics if the number of values differs from the number of fields or a
    /// value's type does not match its field.
    pub fn append_row(&mut self, values: Vec<Value>) {
        self.assert_arity(values.len());
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.append(value);
        }
    }

    /// Appends a row after checking arity and every value's type.
    ///
    /// Either the whole row is appended or no field is modified.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::RowArityMismatch`] or [`FrameError::RowTypeMismatch`]
    /// for the first offending value.
    pub fn append_row_safe(&mut self, values: Vec<Value>) -> FrameResult<()> {
        self.check_row(&values)?;
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.append(value);
        }
        Ok(())
    }

    /// Inserts a row at `row_idx`, shifting later rows down.
    ///
    /// # Panics
    ///
    /// Panics on arity or type mismatch, or if `row_idx` is past the end.
    pub fn insert_row(&mut self, row_idx: usize, values: Vec<Value>) {
        self.assert_arity(values.len());
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.insert(row_idx, value);
        }
    }

    /// Overwrites every value of row `row_idx`.
    ///
    /// # Panics
    ///
    /// Panics on arity or type mismatch, or if `row_idx` is out of range.
    pub fn set_row(&mut self, row_idx: usize, values: Vec<Value>) {
        self.assert_arity(values.len());
        for (field, value) in self.fields.iter_mut().zip(values) {
            field.set(row_idx, value);
        }
    }

    /// Removes row `row_idx` from every field.
    ///
    /// # Panics
    ///
    /// Panics if `row_idx` is out of range for any field.
    pub fn delete_row(&mut self, row_idx: usize) {
        for field in &mut self.fields {
            field.delete(row_idx);
        }
    }

    /// Owned copies of every value in row `row_idx`.
    ///
    /// # Panics
    ///
    /// Panics if `row_idx` is out of range for any field.
    #[must_use]
    pub fn row_copy(&self, row_idx: usize) -> Vec<Value> {
        self.fields.iter().map(|f| f.copy_at(row_idx)).collect()
    }

    /// Same name, ref id, field names, labels and types, but no rows.
    ///
    /// Field config, frame meta and warnings are dropped.
    #[must_use]
    pub fn empty_copy(&self) -> Frame {
        Frame {
            name: self.name.clone(),
            ref_id: self.ref_id.clone(),
            meta: None,
            warnings: Vec::new(),
            fields: self.fields.iter().map(Field::empty_copy).collect(),
        }
    }

    /// A new frame holding the rows whose value in `field_idx` satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Propagates [`row_len`](Self::row_len) errors and the first predicate error.
    ///
    /// # Panics
    ///
    /// Panics if `field_idx` is out of range.
    pub fn filter_rows_by_field<F>(&self, field_idx: usize, mut predicate: F) -> FrameResult<Frame>
    where
        F: FnMut(&Value) -> FrameResult<bool>,
    {
        let rows = self.row_len()?;
        let mut filtered = self.empty_copy();
        for row in 0..rows {
            if predicate(&self.fields[field_idx].at(row))? {
                filtered.append_row(self.row_copy(row));
            }
        }
        Ok(filtered)
    }

    fn assert_arity(&self, actual: usize) {
        assert!(
            actual == self.fields.len(),
            "row has {actual} values but frame has {} fields",
            self.fields.len()
        );
    }

    fn check_row(&self, values: &[Value]) -> FrameResult<()> {
        if values.len() != self.fields.len() {
            return Err(FrameError::RowArityMismatch {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        for (field_index, (field, value)) in self.fields.iter().zip(values).enumerate() {
            if !field.vector().accepts(value) {
                return Err(FrameError::RowTypeMismatch {
                    field_index,
                    expected: field.field_type(),
                    actual: value.type_name().to_string(),
                });
            }
        }
        Ok(())
    }
}

// ── Frames ─────────────────────────────────────────────────────────

/// An ordered list of frames, e.g. all frames returned for one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frames(pub Vec<Frame>);

impl Deref for Frames {
    type Target = Vec<Frame>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Frames {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Frame>> for Frames {
    fn from(frames: Vec<Frame>) -> Self {
        Self(frames)
    }
}

impl FromIterator<Frame> for Frames {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Labels;
    use crate::meta::{FieldConfig, NoticeSeverity};

    fn sample() -> Frame {
        Frame::new("sample").with_ref_id("A").with_fields(vec![
            Field::new("id", vec![1i64, 2, 3]),
            Field::new("name", vec!["a".to_string(), "b".into(), "c".into()]),
            Field::new("score", vec![Some(1.0f64), None, Some(3.0)]),
        ])
    }

    #[test]
    fn test_row_len() {
        assert_eq!(sample().row_len().unwrap(), 3);
        assert!(matches!(Frame::new("x").row_len(), Err(FrameError::NoFields)));
    }

    #[test]
    fn test_row_len_mismatch_names_field() {
        let frame = Frame::new("bad").with_fields(vec![
            Field::new("a", vec![1i8, 2, 3]),
            Field::new("b", vec![1i8, 2, 3]),
            Field::new("c", vec![1i8, 2]),
        ]);
        let err = frame.row_len().unwrap_err();
        assert!(matches!(
            err,
            FrameError::RowLengthMismatch {
                field_index: 2,
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(frame.rows(), 0);
    }

    #[test]
    fn test_append_row_safe_is_atomic() {
        let mut frame = sample();
        let err = frame
            .append_row_safe(vec![
                Value::Int64(4),
                Value::from("d"),
                Value::Float64(4.0),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::RowTypeMismatch {
                field_index: 2,
                expected: FieldType::NullableFloat64,
                ..
            }
        ));
        for field in &frame.fields {
            assert_eq!(field.len(), 3);
        }
    }

    #[test]
    fn test_append_row_safe_arity() {
        let mut frame = sample();
        let err = frame.append_row_safe(vec![Value::Int64(4)]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::RowArityMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_append_row_safe_accepts_null_for_nullable() {
        let mut frame = sample();
        frame
            .append_row_safe(vec![Value::Int64(4), Value::from("d"), Value::Null])
            .unwrap();
        assert_eq!(frame.row_len().unwrap(), 4);
        assert_eq!(frame.at(2, 3), Value::NullableFloat64(None));
    }

    #[test]
    #[should_panic(expected = "row has 1 values but frame has 3 fields")]
    fn test_append_row_arity_panics() {
        sample().append_row(vec![Value::Int64(1)]);
    }

    #[test]
    fn test_extend_and_set() {
        let mut frame = sample();
        frame.extend(2);
        assert_eq!(frame.row_len().unwrap(), 5);
        frame.set(0, 4, Value::Int64(42));
        frame.set_concrete(2, 4, Value::Float64(0.5));
        assert_eq!(frame.at(0, 4), Value::Int64(42));
        assert_eq!(frame.concrete_at(2, 4), (Value::Float64(0.5), true));
        assert_eq!(frame.concrete_at(2, 3), (Value::Float64(0.0), false));
    }

    #[test]
    fn test_insert_set_delete_rows() {
        let mut frame = sample();
        frame.insert_row(
            1,
            vec![Value::Int64(9), Value::from("z"), Value::NullableFloat64(None)],
        );
        assert_eq!(frame.at(0, 1), Value::Int64(9));
        assert_eq!(frame.at(0, 2), Value::Int64(2));
        frame.set_row(
            0,
            vec![Value::Int64(0), Value::from("y"), Value::NullableFloat64(Some(7.0))],
        );
        assert_eq!(frame.copy_at(1, 0), Value::from("y"));
        frame.delete_row(0);
        assert_eq!(frame.row_len().unwrap(), 3);
        assert_eq!(frame.at(0, 0), Value::Int64(9));
    }

    #[test]
    fn test_empty_copy() {
        let mut frame = sample();
        frame.fields[0] = frame.fields[0]
            .clone()
            .with_labels(Labels::new().with("k", "v"))
            .with_config(FieldConfig::new().with_unit("s"));
        frame.append_notices([Notice::new(NoticeSeverity::Info, "hi")]);
        frame.append_warning("w", "");

        let copy = frame.empty_copy();
        assert_eq!(copy.name, "sample");
        assert_eq!(copy.ref_id, "A");
        assert!(copy.meta.is_none());
        assert!(copy.warnings.is_empty());
        assert_eq!(copy.fields.len(), 3);
        assert_eq!(copy.fields[0].labels.get("k"), Some("v"));
        assert!(copy.fields[0].config.is_none());
        assert_eq!(copy.row_len().unwrap(), 0);
    }

    #[test]
    fn test_filter_rows_by_field() {
        let frame = sample();
        let filtered = frame
            .filter_rows_by_field(2, |v| Ok(!v.is_null()))
            .unwrap();
        assert_eq!(filtered.row_len().unwrap(), 2);
        assert_eq!(filtered.at(0, 1), Value::Int64(3));
        assert_eq!(filtered.at(1, 1), Value::from("c"));
    }

    #[test]
    fn test_filter_rows_predicate_error_propagates() {
        let frame = sample();
        let err = frame
            .filter_rows_by_field(0, |_| Err(FrameError::Predicate("boom".into())))
            .unwrap_err();
        assert!(matches!(err, FrameError::Predicate(ref m) if m == "boom"));
    }

    #[test]
    fn test_lookup_helpers() {
        let frame = sample();
        assert_eq!(frame.field_index_by_name("name"), Some(1));
        assert!(frame.field_by_name("missing").is_none());
        assert_eq!(
            frame.type_indices(&[FieldType::Int64, FieldType::NullableFloat64]),
            vec![0, 2]
        );
        assert_eq!(frame.float_at(2, 2).unwrap(), 3.0);
    }
}
