//! Frame ↔ `RecordBatch`.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_array::{Array, RecordBatch, RecordBatchOptions};
use arrow_schema::{Field as ArrowField, Schema};
use tracing::debug;

use super::column::{arrays_to_vector, vector_to_array};
use super::types::{arrow_to_field_type, field_type_to_arrow};
use super::{
    CONFIG_KEY, FIELD_TYPE_KEY, FRAME_META_KEY, LABELS_KEY, NAME_KEY, REF_ID_KEY, TYPE_ENUM,
    WARNINGS_KEY,
};
use crate::error::FrameResult;
use crate::field::Field;
use crate::frame::Frame;
use crate::types::FieldType;

fn arrow_field(field: &Field) -> FrameResult<ArrowField> {
    let ft = field.field_type();
    let mut metadata = HashMap::new();
    metadata.insert(NAME_KEY.to_string(), field.name.clone());
    if !field.labels.is_empty() {
        metadata.insert(LABELS_KEY.to_string(), serde_json::to_string(&field.labels)?);
    }
    if let Some(config) = &field.config {
        metadata.insert(CONFIG_KEY.to_string(), serde_json::to_string(config)?);
    }
    if matches!(ft, FieldType::Enum | FieldType::NullableEnum) {
        metadata.insert(FIELD_TYPE_KEY.to_string(), TYPE_ENUM.to_string());
    }
    Ok(ArrowField::new(&field.name, field_type_to_arrow(ft), ft.is_nullable()).with_metadata(metadata))
}

fn schema_metadata(frame: &Frame) -> FrameResult<HashMap<String, String>> {
    let mut metadata = HashMap::new();
    metadata.insert(NAME_KEY.to_string(), frame.name.clone());
    metadata.insert(REF_ID_KEY.to_string(), frame.ref_id.clone());
    if let Some(meta) = &frame.meta {
        metadata.insert(FRAME_META_KEY.to_string(), serde_json::to_string(meta)?);
    }
    if !frame.warnings.is_empty() {
        metadata.insert(WARNINGS_KEY.to_string(), serde_json::to_string(&frame.warnings)?);
    }
    Ok(metadata)
}

/// Converts a frame into an Arrow record batch.
///
/// Frame and field metadata travel in the schema and field metadata maps.
///
/// # Errors
///
/// Returns [`FrameError::RowLengthMismatch`](crate::FrameError::RowLengthMismatch)
/// for unequal field lengths and
/// [`FrameError::TimeOutOfRange`](crate::FrameError::TimeOutOfRange) for
/// times outside the nanosecond timestamp range.
pub fn frame_to_arrow(frame: &Frame) -> FrameResult<RecordBatch> {
    let rows = if frame.fields.is_empty() {
        0
    } else {
        frame.row_len()?
    };
    let mut fields = Vec::with_capacity(frame.fields.len());
    let mut columns = Vec::with_capacity(frame.fields.len());
    for field in &frame.fields {
        fields.push(arrow_field(field)?);
        columns.push(vector_to_array(field.vector())?);
    }
    let schema = Arc::new(Schema::new_with_metadata(fields, schema_metadata(frame)?));
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
    debug!(
        frame = %frame.name,
        fields = batch.num_columns(),
        rows,
        "converted frame to arrow"
    );
    Ok(batch)
}

/// Converts an Arrow record batch into a frame.
///
/// # Errors
///
/// Returns [`FrameError::UnsupportedArrowType`](crate::FrameError::UnsupportedArrowType)
/// for columns without a field type and
/// [`FrameError::Json`](crate::FrameError::Json) for unreadable metadata.
pub fn frame_from_arrow(batch: &RecordBatch) -> FrameResult<Frame> {
    frame_from_batches(batch.schema_ref(), std::slice::from_ref(batch))
}

/// Builds one frame from batches sharing `schema`, concatenating their rows.
pub(crate) fn frame_from_batches(schema: &Schema, batches: &[RecordBatch]) -> FrameResult<Frame> {
    let metadata = schema.metadata();
    let mut frame = Frame::new(metadata.get(NAME_KEY).cloned().unwrap_or_default());
    frame.ref_id = metadata.get(REF_ID_KEY).cloned().unwrap_or_default();
    frame.meta = metadata
        .get(FRAME_META_KEY)
        .map(|m| serde_json::from_str(m))
        .transpose()?;
    frame.warnings = metadata
        .get(WARNINGS_KEY)
        .map(|w| serde_json::from_str(w))
        .transpose()?
        .unwrap_or_default();

    for (idx, arrow_field) in schema.fields().iter().enumerate() {
        let field_metadata = arrow_field.metadata();
        let ft = arrow_to_field_type(
            arrow_field.data_type(),
            arrow_field.is_nullable(),
            field_metadata,
        )?;
        let arrays: Vec<&dyn Array> = batches.iter().map(|b| b.column(idx).as_ref()).collect();
        let name = field_metadata
            .get(NAME_KEY)
            .cloned()
            .unwrap_or_else(|| arrow_field.name().clone());
        let mut field = Field::from_vector(name, arrays_to_vector(ft, &arrays)?);
        if let Some(labels) = field_metadata.get(LABELS_KEY) {
            field.labels = serde_json::from_str(labels)?;
        }
        if let Some(config) = field_metadata.get(CONFIG_KEY) {
            field.config = Some(serde_json::from_str(config)?);
        }
        frame.push_field(field);
    }

    debug!(
        frame = %frame.name,
        fields = frame.fields.len(),
        batches = batches.len(),
        rows = frame.rows(),
        "converted arrow to frame"
    );
    Ok(frame)
}
