//! Frame → JSON wire format.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::side::{time_to_wire, write_side_channels, ColumnSidecar};
use super::writer::JsonWriter;
use crate::config::Inclusion;
use crate::error::FrameResult;
use crate::field::Field;
use crate::frame::Frame;
use crate::value::{EnumItemIndex, RawJson};
use crate::vector::{dispatch, Vector};

/// An element type's inline JSON encoding.
pub(crate) trait WireEncode {
    fn encode(&self, w: &mut JsonWriter<'_>, row: usize, side: &mut ColumnSidecar) -> FrameResult<()>;
}

macro_rules! impl_wire_encode_plain {
    ($($t:ty),* $(,)?) => {
        $(
            impl WireEncode for $t {
                fn encode(&self, w: &mut JsonWriter<'_>, _row: usize, _side: &mut ColumnSidecar) -> FrameResult<()> {
                    w.value(self)
                }
            }
        )*
    };
}

impl_wire_encode_plain!(i8, i16, i32, i64, u8, u16, u32, u64, String, bool);

impl WireEncode for f32 {
    fn encode(&self, w: &mut JsonWriter<'_>, row: usize, side: &mut ColumnSidecar) -> FrameResult<()> {
        if side.record_float(row, f64::from(*self)) {
            w.null();
            Ok(())
        } else {
            w.value(self)
        }
    }
}

impl WireEncode for f64 {
    fn encode(&self, w: &mut JsonWriter<'_>, row: usize, side: &mut ColumnSidecar) -> FrameResult<()> {
        if side.record_float(row, *self) {
            w.null();
            Ok(())
        } else {
            w.value(self)
        }
    }
}

impl WireEncode for DateTime<Utc> {
    fn encode(&self, w: &mut JsonWriter<'_>, row: usize, side: &mut ColumnSidecar) -> FrameResult<()> {
        let (millis, nanos) = time_to_wire(self);
        side.record_nanos(row, nanos);
        w.value(&millis)
    }
}

impl WireEncode for RawJson {
    fn encode(&self, w: &mut JsonWriter<'_>, _row: usize, _side: &mut ColumnSidecar) -> FrameResult<()> {
        w.raw(self.as_str());
        Ok(())
    }
}

impl WireEncode for EnumItemIndex {
    fn encode(&self, w: &mut JsonWriter<'_>, _row: usize, _side: &mut ColumnSidecar) -> FrameResult<()> {
        w.value(&self.0)
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encode(&self, w: &mut JsonWriter<'_>, row: usize, side: &mut ColumnSidecar) -> FrameResult<()> {
        match self {
            Some(v) => v.encode(w, row, side),
            None => {
                w.null();
                Ok(())
            }
        }
    }
}

fn write_column<T: WireEncode>(
    w: &mut JsonWriter<'_>,
    values: &[T],
    side: &mut ColumnSidecar,
) -> FrameResult<()> {
    w.begin_array();
    for (row, v) in values.iter().enumerate() {
        v.encode(w, row, side)?;
    }
    w.end_array();
    Ok(())
}

// ── Schema ─────────────────────────────────────────────────────────

fn write_field_schema(w: &mut JsonWriter<'_>, field: &Field) -> FrameResult<()> {
    let ft = field.field_type();
    w.begin_object();
    if !field.name.is_empty() {
        w.entry("name", &field.name)?;
    }
    w.entry("type", ft.simple_type())?;
    w.key("typeInfo")?;
    w.begin_object();
    w.entry("frame", ft.non_nullable_type().item_type_string())?;
    if ft.is_nullable() {
        w.entry("nullable", &true)?;
    }
    w.end_object();
    if !field.labels.is_empty() {
        w.entry("labels", &field.labels)?;
    }
    if let Some(config) = &field.config {
        w.entry("config", config)?;
    }
    w.end_object();
    Ok(())
}

pub(crate) fn write_schema(w: &mut JsonWriter<'_>, frame: &Frame) -> FrameResult<()> {
    w.begin_object();
    if !frame.name.is_empty() {
        w.entry("name", &frame.name)?;
    }
    if !frame.ref_id.is_empty() {
        w.entry("refId", &frame.ref_id)?;
    }
    if let Some(meta) = &frame.meta {
        w.entry("meta", meta)?;
    }
    w.key("fields")?;
    w.begin_array();
    for field in &frame.fields {
        write_field_schema(w, field)?;
    }
    w.end_array();
    w.end_object();
    Ok(())
}

// ── Data ───────────────────────────────────────────────────────────

pub(crate) fn write_data(w: &mut JsonWriter<'_>, frame: &Frame) -> FrameResult<()> {
    let mut sidecars = Vec::with_capacity(frame.fields.len());
    w.begin_object();
    w.key("values")?;
    w.begin_array();
    for field in &frame.fields {
        let vector: &Vector = field.vector();
        let mut side = ColumnSidecar::new(field.field_type().is_time(), field.len());
        dispatch!(vector, v => write_column(w, v.as_slice(), &mut side))?;
        sidecars.push(side);
    }
    w.end_array();
    write_side_channels(w, &sidecars)?;
    w.end_object();

    debug!(
        frame = %frame.name,
        fields = frame.fields.len(),
        entities = sidecars.iter().map(ColumnSidecar::entity_count).sum::<usize>(),
        nanos_fields = sidecars.iter().filter(|s| s.has_nanos()).count(),
        "wrote frame data"
    );
    Ok(())
}

/// Writes one frame object.
pub(crate) fn write_frame(w: &mut JsonWriter<'_>, frame: &Frame, inclusion: Inclusion) -> FrameResult<()> {
    w.begin_object();
    if inclusion.schema() {
        w.key("schema")?;
        write_schema(w, frame)?;
    }
    if inclusion.data() {
        w.key("data")?;
        write_data(w, frame)?;
    }
    w.end_object();
    Ok(())
}
