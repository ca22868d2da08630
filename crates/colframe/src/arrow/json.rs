//! Arrow → JSON wire format without building an intermediate frame.
//!
//! Output is byte-identical to encoding the frame the batch was built from,
//! except that frame warnings are never written.

use arrow_array::{Array, RecordBatch};
use arrow_schema::{Field as ArrowField, Schema};
use chrono::{DateTime, Utc};
use serde_json::value::RawValue;
use tracing::debug;

use super::column::ArrowElement;
use super::ipc::read_ipc;
use super::types::arrow_to_field_type;
use super::{CONFIG_KEY, FRAME_META_KEY, LABELS_KEY, NAME_KEY, REF_ID_KEY};
use crate::config::Inclusion;
use crate::error::{FrameError, FrameResult};
use crate::json::encoder::WireEncode;
use crate::json::side::{write_side_channels, ColumnSidecar};
use crate::json::write_pooled;
use crate::json::writer::JsonWriter;
use crate::types::FieldType;
use crate::value::{EnumItemIndex, RawJson};

/// Metadata text that is embedded verbatim, after checking it is JSON.
fn checked_json<'a>(key: &str, text: &'a str) -> FrameResult<&'a str> {
    serde_json::from_str::<&RawValue>(text).map_err(|e| {
        FrameError::malformed(format!("arrow metadata '{key}' is not valid JSON: {e}"))
    })?;
    Ok(text)
}

fn write_field_schema(w: &mut JsonWriter<'_>, field: &ArrowField) -> FrameResult<()> {
    let metadata = field.metadata();
    let ft = arrow_to_field_type(field.data_type(), field.is_nullable(), metadata)?;
    let name = metadata.get(NAME_KEY).unwrap_or(field.name());

    w.begin_object();
    if !name.is_empty() {
        w.entry("name", name)?;
    }
    w.entry("type", ft.simple_type())?;
    w.key("typeInfo")?;
    w.begin_object();
    w.entry("frame", ft.non_nullable_type().item_type_string())?;
    if ft.is_nullable() {
        w.entry("nullable", &true)?;
    }
    w.end_object();
    for key in [LABELS_KEY, CONFIG_KEY] {
        if let Some(text) = metadata.get(key) {
            w.key(key)?;
            w.raw(checked_json(key, text)?);
        }
    }
    w.end_object();
    Ok(())
}

fn write_schema(w: &mut JsonWriter<'_>, schema: &Schema) -> FrameResult<()> {
    let metadata = schema.metadata();
    w.begin_object();
    for (key, wire_key) in [(NAME_KEY, "name"), (REF_ID_KEY, "refId")] {
        if let Some(value) = metadata.get(key).filter(|v| !v.is_empty()) {
            w.entry(wire_key, value)?;
        }
    }
    if let Some(meta) = metadata.get(FRAME_META_KEY) {
        w.key("meta")?;
        w.raw(checked_json(FRAME_META_KEY, meta)?);
    }
    w.key("fields")?;
    w.begin_array();
    for field in schema.fields() {
        write_field_schema(w, field)?;
    }
    w.end_array();
    w.end_object();
    Ok(())
}

// ── Data ───────────────────────────────────────────────────────────

fn write_column<T: ArrowElement + WireEncode>(
    w: &mut JsonWriter<'_>,
    arrays: &[&dyn Array],
    side: &mut ColumnSidecar,
) -> FrameResult<()> {
    w.begin_array();
    let mut row = 0;
    for array in arrays {
        for v in T::read(*array)? {
            v.encode(w, row, side)?;
            row += 1;
        }
    }
    w.end_array();
    Ok(())
}

fn write_arrow_column(
    w: &mut JsonWriter<'_>,
    ft: FieldType,
    arrays: &[&dyn Array],
    side: &mut ColumnSidecar,
) -> FrameResult<()> {
    match ft.non_nullable_type() {
        FieldType::Int8 => write_column::<i8>(w, arrays, side),
        FieldType::Int16 => write_column::<i16>(w, arrays, side),
        FieldType::Int32 => write_column::<i32>(w, arrays, side),
        FieldType::Int64 => write_column::<i64>(w, arrays, side),
        FieldType::Uint8 => write_column::<u8>(w, arrays, side),
        FieldType::Uint16 => write_column::<u16>(w, arrays, side),
        FieldType::Uint32 => write_column::<u32>(w, arrays, side),
        FieldType::Uint64 => write_column::<u64>(w, arrays, side),
        FieldType::Float32 => write_column::<f32>(w, arrays, side),
        FieldType::Float64 => write_column::<f64>(w, arrays, side),
        FieldType::String => write_column::<String>(w, arrays, side),
        FieldType::Bool => write_column::<bool>(w, arrays, side),
        FieldType::Time => write_column::<DateTime<Utc>>(w, arrays, side),
        FieldType::Json => write_column::<RawJson>(w, arrays, side),
        FieldType::Enum => write_column::<EnumItemIndex>(w, arrays, side),
        other => Err(FrameError::UnsupportedFieldType(other.item_type_string().into())),
    }
}

fn write_data(w: &mut JsonWriter<'_>, schema: &Schema, batches: &[RecordBatch]) -> FrameResult<()> {
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    let mut sidecars = Vec::with_capacity(schema.fields().len());
    w.begin_object();
    w.key("values")?;
    w.begin_array();
    for (idx, field) in schema.fields().iter().enumerate() {
        let ft = arrow_to_field_type(field.data_type(), field.is_nullable(), field.metadata())?;
        let arrays: Vec<&dyn Array> = batches.iter().map(|b| b.column(idx).as_ref()).collect();
        let mut side = ColumnSidecar::new(ft.is_time(), rows);
        write_arrow_column(w, ft, &arrays, &mut side)?;
        sidecars.push(side);
    }
    w.end_array();
    write_side_channels(w, &sidecars)?;
    w.end_object();

    debug!(
        fields = sidecars.len(),
        rows,
        entities = sidecars.iter().map(ColumnSidecar::entity_count).sum::<usize>(),
        "wrote arrow data as json"
    );
    Ok(())
}

fn write_arrow_frame(
    w: &mut JsonWriter<'_>,
    schema: &Schema,
    batches: &[RecordBatch],
    inclusion: Inclusion,
) -> FrameResult<()> {
    w.begin_object();
    if inclusion.schema() {
        w.key("schema")?;
        write_schema(w, schema)?;
    }
    if inclusion.data() {
        w.key("data")?;
        write_data(w, schema, batches)?;
    }
    w.end_object();
    Ok(())
}

/// Writes a record batch in the JSON wire format.
///
/// # Errors
///
/// Returns [`FrameError::UnsupportedArrowType`] for columns without a field
/// type and [`FrameError::MalformedWireData`] for metadata that is not JSON.
pub fn arrow_to_json(batch: &RecordBatch, inclusion: Inclusion) -> FrameResult<Vec<u8>> {
    write_pooled(|w| {
        write_arrow_frame(w, batch.schema_ref(), std::slice::from_ref(batch), inclusion)
    })
}

/// Writes an Arrow IPC file in the JSON wire format as one frame.
///
/// # Errors
///
/// Returns [`FrameError::Arrow`] for invalid IPC data and the errors of
/// [`arrow_to_json`].
pub fn arrow_buffer_to_json(bytes: &[u8], inclusion: Inclusion) -> FrameResult<Vec<u8>> {
    let (schema, batches) = read_ipc(bytes)?;
    write_pooled(|w| write_arrow_frame(w, &schema, &batches, inclusion))
}
