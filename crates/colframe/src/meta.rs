//! Display metadata carried by fields and frames.
//!
//! - [`FieldConfig`]: per-field display hints (unit, decimals, min/max,
//!   thresholds, value mappings, links, enum text)
//! - [`FrameMeta`]: per-frame hints (type, stats, notices, visualisation)
//! - [`Warning`]: producer-attached warnings kept alongside a frame
//!
//! All types serialize to the camelCase keys consumed by front-end code.
//! Non-finite floats are not representable in JSON: `min`/`max` serialize
//! them as `null`, and threshold steps use `null` for negative infinity.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── FieldConfig ────────────────────────────────────────────────────

/// Display configuration for a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Overrides the field name in displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Display name suggested by the data source.
    #[serde(
        default,
        rename = "displayNameFromDS",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name_from_ds: Option<String>,

    /// Path to the field in the source data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the field can be used in ad hoc filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,

    /// Whether the field can be written back to the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writeable: Option<bool>,

    /// Unit identifier (e.g. `"ms"`, `"bytes"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Number of decimals to display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u16>,

    /// Minimum display value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<ConfFloat64>,

    /// Maximum display value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<ConfFloat64>,

    /// Expected interval between values, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,

    /// Value to text/color mappings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<ValueMapping>,

    /// Threshold steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdsConfig>,

    /// Links attached to values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<DataLink>,

    /// Text shown when there is no value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_value: Option<String>,

    /// Type-specific configuration (enum item text).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_config: Option<FieldTypeConfig>,

    /// Arbitrary panel-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl FieldConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the decimals.
    #[must_use]
    pub fn with_decimals(mut self, decimals: u16) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Sets the min and max display values.
    #[must_use]
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(ConfFloat64(min));
        self.max = Some(ConfFloat64(max));
        self
    }

    /// Sets the threshold steps.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: ThresholdsConfig) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Adds a value mapping.
    #[must_use]
    pub fn with_mapping(mut self, mapping: ValueMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    /// Sets the text of each enum item index.
    #[must_use]
    pub fn with_enum_text(mut self, text: Vec<String>) -> Self {
        self.type_config = Some(FieldTypeConfig {
            enum_config: Some(EnumFieldConfig {
                text,
                ..EnumFieldConfig::default()
            }),
        });
        self
    }

    /// The enum item text, if configured.
    #[must_use]
    pub fn enum_text(&self) -> Option<&[String]> {
        self.type_config
            .as_ref()?
            .enum_config
            .as_ref()
            .map(|e| e.text.as_slice())
    }
}

/// A float that serializes non-finite values as `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfFloat64(pub f64);

impl Serialize for ConfFloat64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de> Deserialize<'de> for ConfFloat64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = Option::<f64>::deserialize(deserializer)?;
        Ok(Self(v.unwrap_or(f64::NAN)))
    }
}

// ── Thresholds ─────────────────────────────────────────────────────

/// How threshold step values are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdsMode {
    /// Step values are absolute.
    #[default]
    Absolute,
    /// Step values are percentages between min and max.
    Percentage,
}

/// Ordered threshold steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Interpretation of step values.
    pub mode: ThresholdsMode,
    /// Steps in ascending order; the first step is usually `-Inf`.
    pub steps: Vec<Threshold>,
}

/// One threshold step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Lower bound of the step; `-Inf` is written as `null`.
    #[serde(with = "neg_inf_as_null")]
    pub value: f64,
    /// Color applied above `value`.
    pub color: String,
    /// Optional state label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Threshold {
    /// Creates a step.
    #[must_use]
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
            state: None,
        }
    }
}

mod neg_inf_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
    }
}

// ── Value mappings ─────────────────────────────────────────────────

/// What a mapped value is displayed as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMappingResult {
    /// Replacement text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Replacement color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Position in the mapping list, for stable legend ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// Special values a [`ValueMapping::Special`] can match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialValueMatch {
    /// Boolean true.
    #[serde(rename = "true")]
    True,
    /// Boolean false.
    #[serde(rename = "false")]
    False,
    /// Null.
    #[serde(rename = "null")]
    Null,
    /// NaN.
    #[serde(rename = "nan")]
    NaN,
    /// Null or NaN.
    #[serde(rename = "null+nan")]
    NullAndNaN,
    /// Empty string.
    #[serde(rename = "empty")]
    Empty,
}

/// Options of a range mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeMappingOptions {
    /// Inclusive lower bound; `None` is unbounded.
    pub from: Option<f64>,
    /// Inclusive upper bound; `None` is unbounded.
    pub to: Option<f64>,
    /// Display result.
    pub result: ValueMappingResult,
}

/// Options of a regex mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexMappingOptions {
    /// Pattern matched against the value's text.
    pub pattern: String,
    /// Display result.
    pub result: ValueMappingResult,
}

/// Options of a special-value mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMappingOptions {
    /// Which special value matches.
    #[serde(rename = "match")]
    pub matcher: SpecialValueMatch,
    /// Display result.
    pub result: ValueMappingResult,
}

/// Maps values to display text, colors or icons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum ValueMapping {
    /// Exact value matches, keyed by the value's text.
    Value(BTreeMap<String, ValueMappingResult>),
    /// Numeric range match.
    Range(RangeMappingOptions),
    /// Regular expression match.
    Regex(RegexMappingOptions),
    /// Special value match.
    Special(SpecialMappingOptions),
}

// ── Links and type config ──────────────────────────────────────────

/// A link attached to field values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLink {
    /// Link title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Open in a new tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_blank: Option<bool>,
    /// Link URL (may contain template variables).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// Type-specific field configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldTypeConfig {
    /// Enum item configuration.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_config: Option<EnumFieldConfig>,
}

/// Display text (and optional styling) of each enum item index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumFieldConfig {
    /// Item text, indexed by `EnumItemIndex`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    /// Item colors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<String>,
    /// Item icons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icon: Vec<String>,
    /// Item descriptions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
}

// ── FrameMeta ──────────────────────────────────────────────────────

/// Metadata about a frame as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMeta {
    /// Frame type hint (e.g. `"timeseries-wide"`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub frame_type: Option<String>,

    /// Version of the frame type contract, `[major, minor]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<[u32; 2]>,

    /// Path of the source this frame was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Separator used in `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_separator: Option<String>,

    /// Arbitrary data-source-specific metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,

    /// Query statistics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<QueryStat>,

    /// Notices shown to the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,

    /// Live channel the frame can be streamed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Preferred visualisation (`"graph"`, `"table"`, `"logs"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_visualisation_type: Option<String>,

    /// The query text actually executed by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_query_string: Option<String>,
}

/// A named statistic about a query, with display config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStat {
    /// Display configuration of the statistic.
    #[serde(flatten)]
    pub config: FieldConfig,
    /// The statistic's value.
    pub value: f64,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    /// Informational.
    #[default]
    Info,
    /// Something may be wrong.
    Warning,
    /// Something is wrong.
    Error,
}

/// Which inspector tab a notice links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectType {
    /// Frame metadata.
    Meta,
    /// Error details.
    Error,
    /// Raw data.
    Data,
    /// Query statistics.
    Stats,
}

/// A message attached to a frame for the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub severity: NoticeSeverity,
    /// Message text.
    pub text: String,
    /// Optional link with more details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Optional inspector tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspect: Option<InspectType>,
}

impl Notice {
    /// Creates a notice.
    #[must_use]
    pub fn new(severity: NoticeSeverity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            link: None,
            inspect: None,
        }
    }
}

/// A producer warning kept with the frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Short message.
    pub message: String,
    /// Longer explanation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}
