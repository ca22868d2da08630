//! # colframe
//!
//! Typed columnar data frames with a lossless JSON wire format and an
//! Apache Arrow bridge.
//!
//! A [`Frame`] is a named, ordered list of [`Field`]s of equal length. Each
//! field owns a [`Vector`] of one of thirty concrete element types: the
//! fixed-width integers and floats, strings, booleans, UTC times, raw JSON
//! values and enum indices, each in a dense and a nullable flavour.
//!
//! - [`json`] encodes frames to the JSON wire format and back, preserving
//!   float NaN and infinities, nanosecond time precision and the full
//!   `u64` range.
//! - [`arrow`] converts frames to Arrow record batches and IPC files, and
//!   writes Arrow data straight to the JSON wire format.
//!
//! ```rust
//! use colframe::{Field, Frame, Inclusion, Value};
//!
//! let mut frame = Frame::new("cpu").with_fields(vec![
//!     Field::new("host", Vec::<String>::new()),
//!     Field::new("load", Vec::<Option<f64>>::new()),
//! ]);
//! frame.append_row(vec![Value::from("a".to_string()), Value::NullableFloat64(Some(0.5))]);
//! assert_eq!(frame.rows(), 1);
//!
//! let bytes = colframe::json::frame_to_json(&frame, Inclusion::All).unwrap();
//! assert_eq!(colframe::json::frame_from_json(&bytes).unwrap(), frame);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arrow;
pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod json;
pub mod meta;
pub mod pool;
pub mod types;
pub mod value;
pub mod vector;

pub use config::{CodecConfig, Inclusion};
pub use error::{FrameError, FrameResult};
pub use field::{Field, Labels};
pub use frame::{Frame, Frames};
pub use json::JsonCodec;
pub use meta::{FieldConfig, FrameMeta, Notice, NoticeSeverity, Warning};
pub use pool::BufferPool;
pub use types::FieldType;
pub use value::{EnumItemIndex, RawJson, Value};
pub use vector::{Element, TypedVector, Vector};
