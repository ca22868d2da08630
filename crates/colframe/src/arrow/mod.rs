//! Apache Arrow bridge.
//!
//! A frame maps to one [`RecordBatch`](arrow_array::RecordBatch): one column
//! per field, with Arrow nullability following the field type. Frame level
//! properties live in the schema metadata and field level ones in each
//! Arrow field's metadata:
//!
//! | key        | schema                    | field                          |
//! |------------|---------------------------|--------------------------------|
//! | `name`     | frame name                | field name                     |
//! | `refId`    | frame ref id              |                                |
//! | `meta`     | frame meta (JSON)         |                                |
//! | `warnings` | frame warnings (JSON)     |                                |
//! | `labels`   |                           | labels (JSON, when non-empty)  |
//! | `config`   |                           | field config (JSON, when set)  |
//! | `type`     |                           | `enum` for enum fields         |
//!
//! Times are stored as nanosecond timestamps without a time zone and JSON
//! values as binary columns holding the encoded text.

mod column;
mod convert;
mod ipc;
mod json;
mod types;

pub use self::convert::{frame_from_arrow, frame_to_arrow};
pub use self::ipc::{frame_from_arrow_ipc, frame_to_arrow_ipc, frames_from_arrow_ipc, frames_to_arrow_ipc};
pub use self::json::{arrow_buffer_to_json, arrow_to_json};
pub use self::types::{arrow_to_field_type, field_type_to_arrow};

/// Metadata key holding the frame or field name.
pub const NAME_KEY: &str = "name";
/// Schema metadata key holding the frame ref id.
pub const REF_ID_KEY: &str = "refId";
/// Schema metadata key holding the frame meta as JSON.
pub const FRAME_META_KEY: &str = "meta";
/// Schema metadata key holding the frame warnings as JSON.
pub const WARNINGS_KEY: &str = "warnings";
/// Field metadata key holding the labels as JSON.
pub const LABELS_KEY: &str = "labels";
/// Field metadata key holding the field config as JSON.
pub const CONFIG_KEY: &str = "config";
/// Field metadata key marking special column types.
pub const FIELD_TYPE_KEY: &str = "type";
/// Value of [`FIELD_TYPE_KEY`] for enum fields.
pub const TYPE_ENUM: &str = "enum";
