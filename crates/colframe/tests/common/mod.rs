//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use colframe::{EnumItemIndex, Field, FieldConfig, Frame, FrameMeta, Labels, RawJson};

/// Routes `tracing` output through the test harness; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

fn json(text: &str) -> RawJson {
    RawJson::new(text).unwrap()
}

/// A three-row frame with one field of every field type.
pub fn all_types_frame() -> Frame {
    let t0 = ts("2021-01-01T00:00:00.123456789Z");
    let t1 = ts("1969-12-31T23:59:59.999999999Z");
    let t2 = ts("2262-04-11T23:47:16Z");
    Frame::new("all types")
        .with_ref_id("A")
        .with_meta(FrameMeta {
            executed_query_string: Some("SELECT *".into()),
            ..FrameMeta::default()
        })
        .with_fields(vec![
            Field::new("int8", vec![i8::MIN, 0, i8::MAX]),
            Field::new("*int8", vec![Some(-1i8), None, Some(1)]),
            Field::new("int16", vec![i16::MIN, 0, i16::MAX]),
            Field::new("*int16", vec![None, Some(2i16), None]),
            Field::new("int32", vec![i32::MIN, 0, i32::MAX]),
            Field::new("*int32", vec![Some(3i32), Some(4), None]),
            Field::new("int64", vec![i64::MIN, 0, i64::MAX]),
            Field::new("*int64", vec![None, None, Some(5i64)]),
            Field::new("uint8", vec![0u8, 1, u8::MAX]),
            Field::new("*uint8", vec![Some(6u8), None, None]),
            Field::new("uint16", vec![0u16, 1, u16::MAX]),
            Field::new("*uint16", vec![None, Some(7u16), Some(8)]),
            Field::new("uint32", vec![0u32, 1, u32::MAX]),
            Field::new("*uint32", vec![Some(9u32), None, Some(10)]),
            Field::new("uint64", vec![0u64, 1, u64::MAX]),
            Field::new("*uint64", vec![Some(u64::MAX), None, Some(0)]),
            Field::new("float32", vec![1.5f32, -0.25, f32::MAX])
                .with_config(FieldConfig::new().with_unit("percent")),
            Field::new("*float32", vec![None, Some(0.1f32), Some(f32::MIN_POSITIVE)]),
            Field::new("float64", vec![0.1f64, -1e300, f64::MAX]),
            Field::new("*float64", vec![Some(2.5f64), None, Some(f64::EPSILON)]),
            Field::new(
                "string",
                vec!["plain".to_string(), String::new(), "quote \" and \u{e9}".to_string()],
            )
            .with_labels(Labels::new().with("host", "a").with("dc", "eu")),
            Field::new("*string", vec![None, Some("x".to_string()), None]),
            Field::new("bool", vec![true, false, true]),
            Field::new("*bool", vec![Some(false), None, Some(true)]),
            Field::new("time", vec![t0, t1, t2]),
            Field::new("*time", vec![None, Some(t0), Some(t1)]),
            Field::new(
                "json",
                vec![json(r#"{"a":[1,2]}"#), json("null"), json(r#""s""#)],
            ),
            Field::new("*json", vec![Some(json("[]")), None, Some(json("3.5"))]),
            Field::new("enum", vec![EnumItemIndex(0), EnumItemIndex(1), EnumItemIndex(u16::MAX)])
                .with_config(FieldConfig::new().with_enum_text(vec!["ok".into(), "bad".into()])),
            Field::new("*enum", vec![None, Some(EnumItemIndex(2)), None]),
        ])
}
