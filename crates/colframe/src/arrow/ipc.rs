//! Arrow IPC file encoding of frames.

use std::io::Cursor;

use arrow_array::RecordBatch;
use arrow_ipc::reader::FileReader;
use arrow_ipc::writer::FileWriter;
use arrow_schema::{ArrowError, SchemaRef};
use tracing::debug;

use super::convert::{frame_from_batches, frame_to_arrow};
use crate::error::FrameResult;
use crate::frame::{Frame, Frames};

/// Serializes a record batch as an Arrow IPC file.
pub(crate) fn write_ipc(batch: &RecordBatch) -> FrameResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = FileWriter::try_new(&mut buf, batch.schema_ref())?;
        writer.write(batch)?;
        writer.finish()?;
    }
    Ok(buf)
}

/// Reads the schema and every record batch of an Arrow IPC file.
pub(crate) fn read_ipc(bytes: &[u8]) -> FrameResult<(SchemaRef, Vec<RecordBatch>)> {
    let reader = FileReader::try_new(Cursor::new(bytes), None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    debug!(batches = batches.len(), bytes = bytes.len(), "read arrow ipc file");
    Ok((schema, batches))
}

/// Encodes a frame as an Arrow IPC file.
///
/// # Errors
///
/// Propagates [`frame_to_arrow`] errors and Arrow write errors.
pub fn frame_to_arrow_ipc(frame: &Frame) -> FrameResult<Vec<u8>> {
    write_ipc(&frame_to_arrow(frame)?)
}

/// Decodes a frame from an Arrow IPC file; multiple batches are concatenated.
///
/// # Errors
///
/// Returns [`FrameError::Arrow`](crate::FrameError::Arrow) for invalid IPC
/// data and the errors of [`frame_from_arrow`](super::frame_from_arrow).
pub fn frame_from_arrow_ipc(bytes: &[u8]) -> FrameResult<Frame> {
    let (schema, batches) = read_ipc(bytes)?;
    frame_from_batches(&schema, &batches)
}

/// Encodes each frame as its own Arrow IPC file.
///
/// # Errors
///
/// Fails on the first frame that cannot be encoded.
pub fn frames_to_arrow_ipc(frames: &Frames) -> FrameResult<Vec<Vec<u8>>> {
    frames.iter().map(frame_to_arrow_ipc).collect()
}

/// Decodes a list of Arrow IPC files, one frame each.
///
/// # Errors
///
/// Fails on the first buffer that cannot be decoded.
pub fn frames_from_arrow_ipc<B: AsRef<[u8]>>(buffers: &[B]) -> FrameResult<Frames> {
    buffers
        .iter()
        .map(|b| frame_from_arrow_ipc(b.as_ref()))
        .collect()
}
