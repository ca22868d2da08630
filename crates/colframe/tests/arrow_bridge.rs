//! Integration tests for the Arrow bridge and its JSON equivalence.

mod common;

use std::sync::Arc;

use arrow_array::{Int32Array, RecordBatch, StringArray};
use arrow_ipc::writer::FileWriter;
use arrow_schema::{DataType, Field as ArrowField, Schema};
use colframe::arrow::{
    arrow_buffer_to_json, arrow_to_json, frame_from_arrow, frame_from_arrow_ipc, frame_to_arrow,
    frame_to_arrow_ipc,
};
use colframe::json::{frame_from_json, frame_to_json};
use colframe::{Field, Frame, FrameError, Inclusion, Value};

use common::{all_types_frame, init_tracing};

#[test]
fn test_every_field_type_through_arrow() {
    init_tracing();
    let frame = all_types_frame();
    let batch = frame_to_arrow(&frame).unwrap();
    assert_eq!(batch.num_columns(), 30);
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(frame_from_arrow(&batch).unwrap(), frame);
}

#[test]
fn test_every_field_type_through_ipc() {
    let frame = all_types_frame();
    let bytes = frame_to_arrow_ipc(&frame).unwrap();
    assert_eq!(frame_from_arrow_ipc(&bytes).unwrap(), frame);
}

#[test]
fn test_arrow_json_equals_frame_json() {
    let frame = all_types_frame();
    let batch = frame_to_arrow(&frame).unwrap();
    let ipc = frame_to_arrow_ipc(&frame).unwrap();
    for inclusion in [Inclusion::All, Inclusion::SchemaOnly, Inclusion::DataOnly] {
        let expected = frame_to_json(&frame, inclusion).unwrap();
        assert_eq!(arrow_to_json(&batch, inclusion).unwrap(), expected);
        assert_eq!(arrow_buffer_to_json(&ipc, inclusion).unwrap(), expected);
    }
    let decoded = frame_from_json(&arrow_to_json(&batch, Inclusion::All).unwrap()).unwrap();
    assert_eq!(decoded, frame);
}

#[test]
fn test_specials_through_arrow_json() {
    let frame = Frame::new("").with_fields(vec![
        Field::new("v", vec![Some(f64::NAN), Some(f64::NEG_INFINITY), None]),
    ]);
    let batch = frame_to_arrow(&frame).unwrap();
    let v: serde_json::Value =
        serde_json::from_slice(&arrow_to_json(&batch, Inclusion::DataOnly).unwrap()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({"data": {
            "values": [[null, null, null]],
            "entities": [{"NaN": [0], "NegInf": [1]}]
        }})
    );
}

#[test]
fn test_multiple_ipc_batches_are_concatenated() {
    let schema = Arc::new(Schema::new(vec![
        ArrowField::new("n", DataType::Int32, false),
        ArrowField::new("s", DataType::Utf8, true),
    ]));
    let first = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec![Some("a"), None])),
        ],
    )
    .unwrap();
    let second = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![3])),
            Arc::new(StringArray::from(vec![Some("c")])),
        ],
    )
    .unwrap();
    let mut buf = Vec::new();
    {
        let mut writer = FileWriter::try_new(&mut buf, &schema).unwrap();
        writer.write(&first).unwrap();
        writer.write(&second).unwrap();
        writer.finish().unwrap();
    }

    let frame = frame_from_arrow_ipc(&buf).unwrap();
    assert_eq!(frame.rows(), 3);
    assert_eq!(frame.at(0, 2), Value::Int32(3));
    assert_eq!(frame.at(1, 1), Value::NullableString(None));

    let text = String::from_utf8(arrow_buffer_to_json(&buf, Inclusion::DataOnly).unwrap()).unwrap();
    assert_eq!(text, r#"{"data":{"values":[[1,2,3],["a",null,"c"]]}}"#);
}

#[test]
fn test_unsupported_arrow_type() {
    let schema = Arc::new(Schema::new(vec![ArrowField::new(
        "d",
        DataType::Date32,
        false,
    )]));
    let batch = RecordBatch::new_empty(schema);
    assert!(matches!(
        frame_from_arrow(&batch),
        Err(FrameError::UnsupportedArrowType(_))
    ));
    assert!(arrow_to_json(&batch, Inclusion::All).is_err());
}
