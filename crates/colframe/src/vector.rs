//! Typed column storage.
//!
//! [`TypedVector<T>`] is the single generic implementation of the vector
//! contract; [`Vector`] is the closed sum type over all thirty
//! `(element, nullability)` pairs, so adding a [`FieldType`] forces every
//! match in the crate to be updated.
//!
//! Out-of-range indices and mismatched dynamic types are programming errors
//! and panic. Checked row insertion lives on [`Frame`](crate::Frame).
//!
//! # Example
//!
//! ```rust
//! use colframe::{TypedVector, Value, Vector};
//!
//! let mut v = Vector::from(TypedVector::from_vec(vec![Some(1i64), None]));
//! v.append(Value::NullableInt64(Some(3)));
//! assert_eq!(v.len(), 3);
//! assert_eq!(v.concrete_at(1), (Value::Int64(0), false));
//! ```

use std::fmt::Debug;

use chrono::{DateTime, Utc};

use crate::types::FieldType;
use crate::value::{for_each_primitive, EnumItemIndex, RawJson, Value};

// ── Element ────────────────────────────────────────────────────────

/// A Rust type that can be stored in a [`Vector`].
///
/// Implemented for the fifteen primitive element types and for `Option<_>`
/// of each of them.
pub trait Element: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// The non-nullable element type behind this element.
    type Concrete: Element;

    /// The field type of a vector holding this element.
    const FIELD_TYPE: FieldType;

    /// The value used for slots created by `extend`.
    fn zero() -> Self;

    /// Converts into a dynamic [`Value`].
    fn into_value(self) -> Value;

    /// Converts from a dynamic [`Value`], giving it back on type mismatch.
    ///
    /// # Errors
    ///
    /// Returns the original value if its type does not match.
    fn from_value(value: Value) -> Result<Self, Value>;

    /// The concrete value, `None` when the slot is null.
    fn to_concrete(&self) -> Option<Self::Concrete>;

    /// Builds an element from a concrete (known non-null) value.
    fn from_concrete(value: Self::Concrete) -> Self;

    /// Borrows the typed storage if `vector` holds this element type.
    fn typed(vector: &Vector) -> Option<&TypedVector<Self>>;

    /// Mutably borrows the typed storage if `vector` holds this element type.
    fn typed_mut(vector: &mut Vector) -> Option<&mut TypedVector<Self>>;

    /// Wraps typed storage into the matching [`Vector`] variant.
    fn into_vector(vector: TypedVector<Self>) -> Vector;
}

macro_rules! impl_element {
    ($(($t:ty, $base:ident, $nullable:ident)),* $(,)?) => {
        $(
            impl Element for $t {
                type Concrete = $t;
                const FIELD_TYPE: FieldType = FieldType::$base;

                fn zero() -> Self {
                    <$t>::default()
                }

                fn into_value(self) -> Value {
                    Value::$base(self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$base(v) => Ok(v),
                        other => Err(other),
                    }
                }

                fn to_concrete(&self) -> Option<Self::Concrete> {
                    Some(self.clone())
                }

                fn from_concrete(value: Self::Concrete) -> Self {
                    value
                }

                fn typed(vector: &Vector) -> Option<&TypedVector<Self>> {
                    match vector {
                        Vector::$base(v) => Some(v),
                        _ => None,
                    }
                }

                fn typed_mut(vector: &mut Vector) -> Option<&mut TypedVector<Self>> {
                    match vector {
                        Vector::$base(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_vector(vector: TypedVector<Self>) -> Vector {
                    Vector::$base(vector)
                }
            }

            impl Element for Option<$t> {
                type Concrete = $t;
                const FIELD_TYPE: FieldType = FieldType::$nullable;

                fn zero() -> Self {
                    None
                }

                fn into_value(self) -> Value {
                    Value::$nullable(self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$nullable(v) => Ok(v),
                        Value::Null => Ok(None),
                        other => Err(other),
                    }
                }

                fn to_concrete(&self) -> Option<Self::Concrete> {
                    self.clone()
                }

                fn from_concrete(value: Self::Concrete) -> Self {
                    Some(value)
                }

                fn typed(vector: &Vector) -> Option<&TypedVector<Self>> {
                    match vector {
                        Vector::$nullable(v) => Some(v),
                        _ => None,
                    }
                }

                fn typed_mut(vector: &mut Vector) -> Option<&mut TypedVector<Self>> {
                    match vector {
                        Vector::$nullable(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_vector(vector: TypedVector<Self>) -> Vector {
                    Vector::$nullable(vector)
                }
            }
        )*
    };
}

for_each_primitive!(impl_element);

fn expect_element<T: Element>(value: Value) -> T {
    T::from_value(value).unwrap_or_else(|v| {
        panic!(
            "vector of type {} cannot hold a value of type {}",
            T::FIELD_TYPE,
            v.type_name()
        )
    })
}

fn expect_concrete<T: Element>(value: Value) -> T::Concrete {
    <T::Concrete as Element>::from_value(value).unwrap_or_else(|v| {
        panic!(
            "vector of type {} cannot hold a concrete value of type {}",
            T::FIELD_TYPE,
            v.type_name()
        )
    })
}

// ── TypedVector ────────────────────────────────────────────────────

/// Growable storage for one element type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedVector<T> {
    values: Vec<T>,
}

impl<T: Element> TypedVector<T> {
    /// Creates a vector of `len` zero (or null) slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![T::zero(); len],
        }
    }

    /// Creates an empty vector with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Wraps existing values.
    #[must_use]
    pub fn from_vec(values: Vec<T>) -> Self {
        Self { values }
    }

    /// The field type of this vector.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        T::FIELD_TYPE
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the vector holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrows the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn at(&self, idx: usize) -> &T {
        &self.values[idx]
    }

    /// Overwrites the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn set(&mut self, idx: usize, value: T) {
        self.values[idx] = value;
    }

    /// Appends one element.
    pub fn append(&mut self, value: T) {
        self.values.push(value);
    }

    /// Grows the vector by `n` zero (or null) slots.
    pub fn extend(&mut self, n: usize) {
        self.values.resize(self.values.len() + n, T::zero());
    }

    /// Inserts at `idx`, shifting later elements right.
    ///
    /// `idx == len()` appends.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len()`.
    pub fn insert(&mut self, idx: usize, value: T) {
        assert!(
            idx <= self.values.len(),
            "insert index {idx} out of range for {} vector of length {}",
            T::FIELD_TYPE,
            self.values.len()
        );
        self.values.insert(idx, value);
    }

    /// Removes the element at `idx`, shifting later elements left.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn delete(&mut self, idx: usize) {
        assert!(
            idx < self.values.len(),
            "delete index {idx} out of range for {} vector of length {}",
            T::FIELD_TYPE,
            self.values.len()
        );
        self.values.remove(idx);
    }

    /// Removes all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The concrete value at `idx`, `None` when the slot is null.
    #[must_use]
    pub fn concrete_at(&self, idx: usize) -> Option<T::Concrete> {
        self.values[idx].to_concrete()
    }

    /// Stores a known non-null value at `idx`.
    pub fn set_concrete(&mut self, idx: usize, value: T::Concrete) {
        self.values[idx] = T::from_concrete(value);
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// Consumes the vector, returning its elements.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    /// Allocated capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    fn value_at(&self, idx: usize) -> Value {
        self.values[idx].clone().into_value()
    }

    fn concrete_value_at(&self, idx: usize) -> (Value, bool) {
        match self.concrete_at(idx) {
            Some(v) => (v.into_value(), true),
            None => (<T::Concrete as Element>::zero().into_value(), false),
        }
    }
}

impl<T: Element> From<Vec<T>> for TypedVector<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<'a, T> IntoIterator for &'a TypedVector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

// ── Vector ─────────────────────────────────────────────────────────

/// Storage for one field: a [`TypedVector`] tagged with its element type.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Vector {
    Int8(TypedVector<i8>),
    NullableInt8(TypedVector<Option<i8>>),
    Int16(TypedVector<i16>),
    NullableInt16(TypedVector<Option<i16>>),
    Int32(TypedVector<i32>),
    NullableInt32(TypedVector<Option<i32>>),
    Int64(TypedVector<i64>),
    NullableInt64(TypedVector<Option<i64>>),
    Uint8(TypedVector<u8>),
    NullableUint8(TypedVector<Option<u8>>),
    Uint16(TypedVector<u16>),
    NullableUint16(TypedVector<Option<u16>>),
    Uint32(TypedVector<u32>),
    NullableUint32(TypedVector<Option<u32>>),
    Uint64(TypedVector<u64>),
    NullableUint64(TypedVector<Option<u64>>),
    Float32(TypedVector<f32>),
    NullableFloat32(TypedVector<Option<f32>>),
    Float64(TypedVector<f64>),
    NullableFloat64(TypedVector<Option<f64>>),
    String(TypedVector<String>),
    NullableString(TypedVector<Option<String>>),
    Bool(TypedVector<bool>),
    NullableBool(TypedVector<Option<bool>>),
    Time(TypedVector<DateTime<Utc>>),
    NullableTime(TypedVector<Option<DateTime<Utc>>>),
    Json(TypedVector<RawJson>),
    NullableJson(TypedVector<Option<RawJson>>),
    Enum(TypedVector<EnumItemIndex>),
    NullableEnum(TypedVector<Option<EnumItemIndex>>),
}

/// Runs `$body` with `$v` bound to the inner [`TypedVector`], whatever its type.
macro_rules! dispatch {
    ($vector:expr, $v:ident => $body:expr) => {
        match $vector {
            Vector::Int8($v) => $body,
            Vector::NullableInt8($v) => $body,
            Vector::Int16($v) => $body,
            Vector::NullableInt16($v) => $body,
            Vector::Int32($v) => $body,
            Vector::NullableInt32($v) => $body,
            Vector::Int64($v) => $body,
            Vector::NullableInt64($v) => $body,
            Vector::Uint8($v) => $body,
            Vector::NullableUint8($v) => $body,
            Vector::Uint16($v) => $body,
            Vector::NullableUint16($v) => $body,
            Vector::Uint32($v) => $body,
            Vector::NullableUint32($v) => $body,
            Vector::Uint64($v) => $body,
            Vector::NullableUint64($v) => $body,
            Vector::Float32($v) => $body,
            Vector::NullableFloat32($v) => $body,
            Vector::Float64($v) => $body,
            Vector::NullableFloat64($v) => $body,
            Vector::String($v) => $body,
            Vector::NullableString($v) => $body,
            Vector::Bool($v) => $body,
            Vector::NullableBool($v) => $body,
            Vector::Time($v) => $body,
            Vector::NullableTime($v) => $body,
            Vector::Json($v) => $body,
            Vector::NullableJson($v) => $body,
            Vector::Enum($v) => $body,
            Vector::NullableEnum($v) => $body,
        }
    };
}
pub(crate) use dispatch;

macro_rules! impl_new_vector {
    ($(($t:ty, $base:ident, $nullable:ident)),* $(,)?) => {
        impl Vector {
            /// Allocates a vector of `len` zero (or null) slots of type `ft`.
            ///
            /// # Panics
            ///
            /// Panics on [`FieldType::Unknown`].
            #[must_use]
            pub fn new(ft: FieldType, len: usize) -> Vector {
                match ft {
                    $(
                        FieldType::$base => Vector::$base(TypedVector::new(len)),
                        FieldType::$nullable => Vector::$nullable(TypedVector::new(len)),
                    )*
                    FieldType::Unknown => panic!("unsupported vector type: unknown field type"),
                }
            }

            /// Allocates an empty vector of type `ft` with room for `capacity` elements.
            ///
            /// # Panics
            ///
            /// Panics on [`FieldType::Unknown`].
            #[must_use]
            pub fn with_capacity(ft: FieldType, capacity: usize) -> Vector {
                match ft {
                    $(
                        FieldType::$base => Vector::$base(TypedVector::with_capacity(capacity)),
                        FieldType::$nullable => {
                            Vector::$nullable(TypedVector::with_capacity(capacity))
                        }
                    )*
                    FieldType::Unknown => panic!("unsupported vector type: unknown field type"),
                }
            }
        }
    };
}

for_each_primitive!(impl_new_vector);

impl Vector {
    /// The element type; constant for the vector's lifetime.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        dispatch!(self, v => v.field_type())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    /// Returns `true` if the vector holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `idx`; nullable vectors return their nullable variant.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn at(&self, idx: usize) -> Value {
        dispatch!(self, v => v.value_at(idx))
    }

    /// An owned, independent copy of the value at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn copy_at(&self, idx: usize) -> Value {
        self.at(idx)
    }

    /// The non-nullable value at `idx` and whether the slot was present.
    ///
    /// A null slot yields the zero value of the concrete type and `false`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    #[must_use]
    pub fn concrete_at(&self, idx: usize) -> (Value, bool) {
        dispatch!(self, v => v.concrete_value_at(idx))
    }

    /// Overwrites the value at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or `value` has a different type.
    pub fn set(&mut self, idx: usize, value: Value) {
        dispatch!(self, v => v.set(idx, expect_element(value)));
    }

    /// Stores a non-nullable value at `idx`; on nullable vectors the slot
    /// becomes non-null.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range or `value` is not the concrete type.
    pub fn set_concrete(&mut self, idx: usize, value: Value) {
        dispatch!(self, v => {
            let c = expect_concrete_for(v, value);
            v.set_concrete(idx, c);
        });
    }

    /// Appends one value.
    ///
    /// # Panics
    ///
    /// Panics if `value` has a different type, or is null on a non-nullable vector.
    pub fn append(&mut self, value: Value) {
        dispatch!(self, v => v.append(expect_element(value)));
    }

    /// Grows the vector by `n` zero (or null) slots.
    pub fn extend(&mut self, n: usize) {
        dispatch!(self, v => v.extend(n));
    }

    /// Inserts at `idx`; `idx == len()` appends.
    ///
    /// # Panics
    ///
    /// Panics if `idx > len()` or `value` has a different type.
    pub fn insert(&mut self, idx: usize, value: Value) {
        dispatch!(self, v => v.insert(idx, expect_element(value)));
    }

    /// Removes the element at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range.
    pub fn delete(&mut self, idx: usize) {
        dispatch!(self, v => v.delete(idx));
    }

    /// Removes all elements, keeping the allocation.
    pub fn clear(&mut self) {
        dispatch!(self, v => v.clear());
    }

    /// Returns `true` if `value` could be appended to this vector.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.field_type().is_nullable(),
            other => other.field_type() == Some(self.field_type()),
        }
    }

    /// An empty vector of the same type.
    #[must_use]
    pub fn empty_copy(&self) -> Vector {
        Vector::new(self.field_type(), 0)
    }

    /// Borrows the typed storage, if this vector holds `T`.
    #[must_use]
    pub fn as_typed<T: Element>(&self) -> Option<&TypedVector<T>> {
        T::typed(self)
    }

    /// Mutably borrows the typed storage, if this vector holds `T`.
    pub fn as_typed_mut<T: Element>(&mut self) -> Option<&mut TypedVector<T>> {
        T::typed_mut(self)
    }
}

fn expect_concrete_for<T: Element>(_: &TypedVector<T>, value: Value) -> T::Concrete {
    expect_concrete::<T>(value)
}

impl<T: Element> From<TypedVector<T>> for Vector {
    fn from(vector: TypedVector<T>) -> Self {
        T::into_vector(vector)
    }
}

impl<T: Element> From<Vec<T>> for Vector {
    fn from(values: Vec<T>) -> Self {
        T::into_vector(TypedVector::from_vec(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vector_zero_filled() {
        for &ft in FieldType::all() {
            let v = Vector::new(ft, 3);
            assert_eq!(v.field_type(), ft);
            assert_eq!(v.len(), 3);
            if ft.is_nullable() {
                assert!(v.at(0).is_null(), "{ft}");
            } else {
                assert!(!v.at(0).is_null(), "{ft}");
            }
        }
    }

    #[test]
    fn test_set_and_at() {
        let mut v = Vector::new(FieldType::Int64, 2);
        v.set(1, Value::Int64(7));
        assert_eq!(v.at(1), Value::Int64(7));
        assert_eq!(v.copy_at(0), Value::Int64(0));
    }

    #[test]
    #[should_panic(expected = "cannot hold a value of type string")]
    fn test_set_wrong_type_panics() {
        let mut v = Vector::new(FieldType::Int64, 1);
        v.set(0, Value::from("x"));
    }

    #[test]
    #[should_panic(expected = "cannot hold a value of type null")]
    fn test_append_null_to_non_nullable_panics() {
        let mut v = Vector::new(FieldType::Bool, 0);
        v.append(Value::Null);
    }

    #[test]
    fn test_nullable_at_returns_optional() {
        let mut v = Vector::new(FieldType::NullableFloat64, 0);
        v.append(Value::Null);
        v.append(Value::NullableFloat64(Some(1.5)));
        assert_eq!(v.at(0), Value::NullableFloat64(None));
        assert_eq!(v.at(1), Value::NullableFloat64(Some(1.5)));
    }

    #[test]
    fn test_concrete_at() {
        let v = Vector::from(vec![Some("a".to_string()), None]);
        assert_eq!(v.concrete_at(0), (Value::String("a".into()), true));
        assert_eq!(v.concrete_at(1), (Value::String(String::new()), false));

        let dense = Vector::from(vec![5u16]);
        assert_eq!(dense.concrete_at(0), (Value::Uint16(5), true));
    }

    #[test]
    fn test_set_concrete_on_nullable() {
        let mut v = Vector::new(FieldType::NullableInt32, 1);
        v.set_concrete(0, Value::Int32(9));
        assert_eq!(v.at(0), Value::NullableInt32(Some(9)));
    }

    #[test]
    fn test_insert_shifts_elements() {
        let mut v = TypedVector::from_vec(vec![1i32, 2, 3]);
        v.insert(1, 10);
        assert_eq!(v.as_slice(), &[1, 10, 2, 3]);
        v.insert(4, 20);
        assert_eq!(v.as_slice(), &[1, 10, 2, 3, 20]);
    }

    #[test]
    #[should_panic(expected = "insert index 5 out of range")]
    fn test_insert_past_end_panics() {
        let mut v = TypedVector::from_vec(vec![1i32, 2, 3]);
        v.insert(5, 0);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn test_at_out_of_range_panics() {
        let v = Vector::new(FieldType::String, 1);
        let _ = v.at(1);
    }

    #[test]
    fn test_delete_and_clear_keep_capacity() {
        let mut v = TypedVector::from_vec(vec![1u8, 2, 3]);
        v.delete(0);
        assert_eq!(v.as_slice(), &[2, 3]);
        let cap = v.capacity();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), cap);
    }

    #[test]
    fn test_extend_with_nulls() {
        let mut v = Vector::from(vec![Some(true)]);
        v.extend(2);
        assert_eq!(v.len(), 3);
        assert_eq!(v.at(2), Value::NullableBool(None));
    }

    #[test]
    fn test_typed_access() {
        let v = Vector::from(vec![1.0f64, 2.0]);
        assert!(v.as_typed::<f32>().is_none());
        assert_eq!(v.as_typed::<f64>().unwrap().as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_accepts() {
        let v = Vector::new(FieldType::NullableTime, 0);
        assert!(v.accepts(&Value::Null));
        assert!(v.accepts(&Value::NullableTime(None)));
        assert!(!v.accepts(&Value::Time(Utc::now())));
        let dense = Vector::new(FieldType::Time, 0);
        assert!(!dense.accepts(&Value::Null));
    }
}
