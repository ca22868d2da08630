//! JSON wire codec for frames.
//!
//! One frame is a JSON object with up to two keys:
//!
//! ```text
//! {
//!   "schema": {"name": .., "refId": .., "meta": .., "fields": [
//!       {"name": .., "type": "number", "typeInfo": {"frame": "float64", "nullable": true},
//!        "labels": {..}, "config": {..}}
//!   ]},
//!   "data": {"values": [[..], [..]], "entities": [..], "nanos": [..]}
//! }
//! ```
//!
//! `values` holds one array per field. Float NaN and infinities are written
//! as `null` and listed per field in `entities`; times are epoch milliseconds
//! with the sub-millisecond remainder in `nanos`. Both side channels are
//! omitted when unused.
//!
//! # Example
//!
//! ```rust
//! use colframe::json::{frame_from_json, frame_to_json};
//! use colframe::{Field, Frame, Inclusion};
//!
//! let frame = Frame::new("f").with_fields(vec![Field::new("v", vec![1.5f64, f64::NAN])]);
//! let bytes = frame_to_json(&frame, Inclusion::All).unwrap();
//! let back = frame_from_json(&bytes).unwrap();
//! assert!(back.fields[0].typed::<f64>().unwrap().at(1).is_nan());
//! ```

mod decoder;
pub(crate) mod encoder;
pub(crate) mod side;
pub(crate) mod writer;

use std::sync::LazyLock;

use tracing::debug;

use self::writer::JsonWriter;
use crate::config::{CodecConfig, Inclusion};
use crate::error::{FrameError, FrameResult};
use crate::frame::{Frame, Frames};
use crate::pool::BufferPool;

/// Encodes and decodes frames, reusing output buffers across calls.
///
/// A codec is `Sync`; share one across threads to share its buffer pool.
#[derive(Debug)]
pub struct JsonCodec {
    config: CodecConfig,
    pool: BufferPool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl JsonCodec {
    /// Creates a codec.
    #[must_use]
    pub fn new(config: CodecConfig) -> Self {
        let pool = BufferPool::new(
            config.pool_capacity,
            config.initial_buffer_bytes,
            config.max_retained_buffer_bytes,
        );
        Self { config, pool }
    }

    /// Creates a codec after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidConfig`] if the buffer sizes are inconsistent.
    pub fn try_new(config: CodecConfig) -> FrameResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// The codec configuration.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes a frame using the configured inclusion mode.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::RowLengthMismatch`] if data is written for a frame
    /// whose fields have unequal lengths.
    pub fn encode(&self, frame: &Frame) -> FrameResult<Vec<u8>> {
        self.encode_with(frame, self.config.inclusion)
    }

    /// Encodes a frame with an explicit inclusion mode.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_with(&self, frame: &Frame, inclusion: Inclusion) -> FrameResult<Vec<u8>> {
        check_encodable(frame, inclusion)?;
        let mut buf = self.pool.acquire();
        let mut w = JsonWriter::new(&mut buf);
        encoder::write_frame(&mut w, frame, inclusion)?;
        debug!(frame = %frame.name, bytes = buf.len(), ?inclusion, "encoded frame");
        Ok(buf.to_vec())
    }

    /// Encodes frames as a JSON array of frame objects.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    pub fn encode_frames(&self, frames: &Frames) -> FrameResult<Vec<u8>> {
        let inclusion = self.config.inclusion;
        for frame in frames.iter() {
            check_encodable(frame, inclusion)?;
        }
        let mut buf = self.pool.acquire();
        let mut w = JsonWriter::new(&mut buf);
        w.begin_array();
        for frame in frames.iter() {
            encoder::write_frame(&mut w, frame, inclusion)?;
        }
        w.end_array();
        debug!(frames = frames.len(), bytes = buf.len(), "encoded frames");
        Ok(buf.to_vec())
    }

    /// Decodes a frame object that carries a schema.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedWireData`] for structural problems,
    /// [`FrameError::UnknownFieldTypeName`] for unknown type names (when
    /// strict).
    pub fn decode(&self, bytes: &[u8]) -> FrameResult<Frame> {
        let wire = decoder::parse_frame(utf8(bytes)?)?;
        decoder::decode_frame(wire, self.config.strict_type_names)
    }

    /// Decodes a JSON array of frame objects.
    ///
    /// # Errors
    ///
    /// See [`decode`](Self::decode).
    pub fn decode_frames(&self, bytes: &[u8]) -> FrameResult<Frames> {
        let raw = decoder::parse_frame_list(utf8(bytes)?)?;
        raw.into_iter()
            .map(|r| {
                let wire = decoder::parse_frame(r.get())?;
                decoder::decode_frame(wire, self.config.strict_type_names)
            })
            .collect()
    }

    /// Fills an existing frame, typically decoded from a schema-only payload,
    /// with the `data` of a data-only payload.
    ///
    /// Any rows already in `frame` are replaced. On error `frame` is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedWireData`] if the payload has no data or
    /// does not match the frame's fields.
    pub fn decode_data_into(&self, frame: &mut Frame, bytes: &[u8]) -> FrameResult<()> {
        let wire = decoder::parse_frame(utf8(bytes)?)?;
        let data = wire
            .data
            .ok_or_else(|| FrameError::malformed("payload has no data"))?;
        decoder::fill_frame(frame, data)?;
        debug!(frame = %frame.name, rows = frame.rows(), "decoded frame data");
        Ok(())
    }
}

fn utf8(bytes: &[u8]) -> FrameResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| FrameError::malformed(format!("payload is not UTF-8: {e}")))
}

fn check_encodable(frame: &Frame, inclusion: Inclusion) -> FrameResult<()> {
    if inclusion.data() && !frame.fields.is_empty() {
        frame.row_len()?;
    }
    Ok(())
}

static DEFAULT_CODEC: LazyLock<JsonCodec> = LazyLock::new(JsonCodec::default);

/// Runs `write` against a buffer from the default codec's pool and returns
/// a copy of the output on success.
pub(crate) fn write_pooled<F>(write: F) -> FrameResult<Vec<u8>>
where
    F: FnOnce(&mut JsonWriter<'_>) -> FrameResult<()>,
{
    let mut buf = DEFAULT_CODEC.pool.acquire();
    let mut w = JsonWriter::new(&mut buf);
    write(&mut w)?;
    Ok(buf.to_vec())
}

/// Encodes a frame with the default codec.
///
/// # Errors
///
/// See [`JsonCodec::encode`].
pub fn frame_to_json(frame: &Frame, inclusion: Inclusion) -> FrameResult<Vec<u8>> {
    DEFAULT_CODEC.encode_with(frame, inclusion)
}

/// Decodes a frame with the default codec.
///
/// # Errors
///
/// See [`JsonCodec::decode`].
pub fn frame_from_json(bytes: &[u8]) -> FrameResult<Frame> {
    DEFAULT_CODEC.decode(bytes)
}

/// Encodes frames as a JSON array with the default codec.
///
/// # Errors
///
/// See [`JsonCodec::encode`].
pub fn frames_to_json(frames: &Frames) -> FrameResult<Vec<u8>> {
    DEFAULT_CODEC.encode_frames(frames)
}

/// Decodes a JSON array of frames with the default codec.
///
/// # Errors
///
/// See [`JsonCodec::decode`].
pub fn frames_from_json(bytes: &[u8]) -> FrameResult<Frames> {
    DEFAULT_CODEC.decode_frames(bytes)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::field::{Field, Labels};
    use crate::meta::{FieldConfig, FrameMeta};
    use crate::value::{EnumItemIndex, RawJson};

    fn json_value(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_schema_key_order() {
        let frame = Frame::new("cpu")
            .with_ref_id("A")
            .with_meta(FrameMeta::default())
            .with_fields(vec![Field::new("v", vec![Some(1i64)])
                .with_labels(Labels::new().with("host", "a"))
                .with_config(FieldConfig::new().with_unit("s"))]);
        let bytes = frame_to_json(&frame, Inclusion::SchemaOnly).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(r#"{"schema":{"name":"cpu","refId":"A","meta":"#));
        assert!(text.contains(
            r#"{"name":"v","type":"number","typeInfo":{"frame":"int64","nullable":true},"labels":{"host":"a"},"config":{"unit":"s"}}"#
        ));
        assert!(!text.contains("\"data\""));
    }

    #[test]
    fn test_json_null_literal_collapses_in_nullable_field() {
        let null = RawJson::new("null").unwrap();
        let frame = Frame::new("").with_fields(vec![
            Field::new("n", vec![Some(null.clone()), None]),
            Field::new("d", vec![null.clone(), RawJson::new("1").unwrap()]),
        ]);
        let back = frame_from_json(&frame_to_json(&frame, Inclusion::All).unwrap()).unwrap();
        let n = back.fields[0].typed::<Option<RawJson>>().unwrap();
        assert_eq!(n.at(0), &None);
        assert_eq!(n.at(1), &None);
        assert_eq!(back.fields[1].typed::<RawJson>().unwrap().at(0), &null);
    }

    #[test]
    fn test_decode_reports_bad_envelope_as_malformed() {
        for bytes in [&b"{\"data\":{\"values\":5}}"[..], b"[[1,2", b"\xff"] {
            assert!(matches!(
                frame_from_json(bytes),
                Err(FrameError::MalformedWireData(_))
            ));
        }
        assert!(matches!(
            frames_from_json(b"{}"),
            Err(FrameError::MalformedWireData(_))
        ));
    }

    #[test]
    fn test_float_entities_written() {
        let frame = Frame::new("").with_fields(vec![
            Field::new("a", vec![1i32, 2, 3, 4]),
            Field::new("b", vec![1.5f64, f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
        ]);
        let v = json_value(&frame_to_json(&frame, Inclusion::DataOnly).unwrap());
        assert_eq!(v["data"]["values"][1], serde_json::json!([1.5, null, null, null]));
        assert_eq!(
            v["data"]["entities"],
            serde_json::json!([null, {"NaN": [1], "Inf": [2], "NegInf": [3]}])
        );
        assert!(v["data"].get("nanos").is_none());
    }

    #[test]
    fn test_side_channels_omitted_when_unused() {
        let frame = Frame::new("").with_fields(vec![Field::new("a", vec![1.0f32])]);
        let text = String::from_utf8(frame_to_json(&frame, Inclusion::DataOnly).unwrap()).unwrap();
        assert_eq!(text, r#"{"data":{"values":[[1.0]]}}"#);
    }

    #[test]
    fn test_time_nanos_written() {
        let t = DateTime::parse_from_rfc3339("2021-01-01T00:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let whole = DateTime::from_timestamp_millis(1000).unwrap();
        let frame = Frame::new("").with_fields(vec![Field::new("t", vec![Some(whole), Some(t), None])]);
        let v = json_value(&frame_to_json(&frame, Inclusion::DataOnly).unwrap());
        assert_eq!(
            v["data"]["values"][0],
            serde_json::json!([1000, 1_609_459_200_123_i64, null])
        );
        assert_eq!(v["data"]["nanos"], serde_json::json!([[0, 456_789, 0]]));
    }

    #[test]
    fn test_round_trip_with_codec() {
        let codec = JsonCodec::new(CodecConfig::default().with_pool_capacity(1));
        let frame = Frame::new("r").with_fields(vec![
            Field::new("u", vec![u64::MAX, 0]),
            Field::new("j", vec![RawJson::new("[1,{\"a\":null}]").unwrap(), RawJson::default()]),
            Field::new("e", vec![Some(EnumItemIndex(2)), None]),
        ]);
        let bytes = codec.encode(&frame).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), frame);
        assert_eq!(codec.pool.idle(), 1);
    }

    #[test]
    fn test_encode_rejects_unequal_fields() {
        let frame = Frame::new("").with_fields(vec![
            Field::new("a", vec![1i8, 2]),
            Field::new("b", vec![1i8]),
        ]);
        assert!(matches!(
            frame_to_json(&frame, Inclusion::All),
            Err(FrameError::RowLengthMismatch { field_index: 1, .. })
        ));
        assert!(frame_to_json(&frame, Inclusion::SchemaOnly).is_ok());
    }

    #[test]
    fn test_schema_then_data() {
        let frame = Frame::new("s").with_fields(vec![
            Field::new("a", vec![1u8, 2]),
            Field::new("b", vec![Some("x".to_string()), None]),
        ]);
        let schema = frame_to_json(&frame, Inclusion::SchemaOnly).unwrap();
        let data = frame_to_json(&frame, Inclusion::DataOnly).unwrap();

        let mut decoded = frame_from_json(&schema).unwrap();
        assert_eq!(decoded.row_len().unwrap(), 0);
        DEFAULT_CODEC.decode_data_into(&mut decoded, &data).unwrap();
        assert_eq!(decoded, frame);

        let mut untouched = frame.empty_copy();
        assert!(DEFAULT_CODEC
            .decode_data_into(&mut untouched, br#"{"data":{"values":[[1]]}}"#)
            .is_err());
        assert_eq!(untouched.row_len().unwrap(), 0);
    }

    #[test]
    fn test_try_new_validates_config() {
        let bad = CodecConfig::default()
            .with_initial_buffer_bytes(1 << 20)
            .with_max_retained_buffer_bytes(1024);
        assert!(matches!(
            JsonCodec::try_new(bad),
            Err(FrameError::InvalidConfig { .. })
        ));
        assert!(JsonCodec::try_new(CodecConfig::default()).is_ok());
    }

    #[test]
    fn test_frames_array() {
        let frames = Frames::from(vec![
            Frame::new("a").with_fields(vec![Field::new("x", vec![true])]),
            Frame::new("b").with_fields(vec![Field::new("y", vec![Some(false), None])]),
        ]);
        let bytes = frames_to_json(&frames).unwrap();
        assert_eq!(json_value(&bytes).as_array().unwrap().len(), 2);
        assert_eq!(frames_from_json(&bytes).unwrap(), frames);
    }
}
