//! The `entities` and `nanos` side channels.
//!
//! JSON has no NaN or infinities, and epoch milliseconds lose anything finer
//! than a millisecond. Writers put `null` (or the millisecond value) inline
//! and record what was lost per field; readers put it back.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::writer::JsonWriter;
use crate::error::{FrameError, FrameResult};

const NANOS_PER_MILLI: i64 = 1_000_000;

// ── Float entities ─────────────────────────────────────────────────

/// A float value JSON cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Special {
    NaN,
    Inf,
    NegInf,
}

impl Special {
    pub(crate) fn classify(v: f64) -> Option<Self> {
        if v.is_nan() {
            Some(Self::NaN)
        } else if v == f64::INFINITY {
            Some(Self::Inf)
        } else if v == f64::NEG_INFINITY {
            Some(Self::NegInf)
        } else {
            None
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Self::NaN => f64::NAN,
            Self::Inf => f64::INFINITY,
            Self::NegInf => f64::NEG_INFINITY,
        }
    }

    pub(crate) fn as_f32(self) -> f32 {
        match self {
            Self::NaN => f32::NAN,
            Self::Inf => f32::INFINITY,
            Self::NegInf => f32::NEG_INFINITY,
        }
    }
}

/// Row indices of the special values in one float field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EntityLookup {
    #[serde(rename = "NaN", default, skip_serializing_if = "Vec::is_empty")]
    nan: Vec<usize>,
    #[serde(rename = "Inf", default, skip_serializing_if = "Vec::is_empty")]
    inf: Vec<usize>,
    #[serde(rename = "NegInf", default, skip_serializing_if = "Vec::is_empty")]
    neg_inf: Vec<usize>,
}

impl EntityLookup {
    pub(crate) fn record(&mut self, special: Special, row: usize) {
        match special {
            Special::NaN => self.nan.push(row),
            Special::Inf => self.inf.push(row),
            Special::NegInf => self.neg_inf.push(row),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nan.is_empty() && self.inf.is_empty() && self.neg_inf.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.nan.len() + self.inf.len() + self.neg_inf.len()
    }

    /// Indexes the lookup by row, rejecting rows past `rows`.
    fn into_rows(self, field_idx: usize, rows: usize) -> FrameResult<HashMap<usize, Special>> {
        let mut by_row = HashMap::with_capacity(self.len());
        for (indices, special) in [
            (self.nan, Special::NaN),
            (self.inf, Special::Inf),
            (self.neg_inf, Special::NegInf),
        ] {
            for row in indices {
                if row >= rows {
                    return Err(FrameError::malformed(format!(
                        "entity index {row} out of range for field {field_idx} with {rows} rows"
                    )));
                }
                by_row.insert(row, special);
            }
        }
        Ok(by_row)
    }
}

// ── Time ───────────────────────────────────────────────────────────

/// Splits a time into epoch milliseconds and the sub-millisecond remainder.
pub(crate) fn time_to_wire(t: &DateTime<Utc>) -> (i64, i64) {
    (
        t.timestamp_millis(),
        i64::from(t.timestamp_subsec_nanos()) % NANOS_PER_MILLI,
    )
}

pub(crate) fn time_from_wire(millis: i64, nanos: i64) -> FrameResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .and_then(|t| t.checked_add_signed(TimeDelta::nanoseconds(nanos)))
        .ok_or_else(|| FrameError::TimeOutOfRange(format!("{millis}ms + {nanos}ns")))
}

// ── Writing ────────────────────────────────────────────────────────

/// Side-channel state collected while one column is written.
#[derive(Debug, Default)]
pub(crate) struct ColumnSidecar {
    entities: EntityLookup,
    nanos: Vec<i64>,
    has_nanos: bool,
}

impl ColumnSidecar {
    pub(crate) fn new(is_time: bool, rows: usize) -> Self {
        Self {
            entities: EntityLookup::default(),
            nanos: if is_time { vec![0; rows] } else { Vec::new() },
            has_nanos: false,
        }
    }

    /// Records `v` if it is special; returns `true` when it was.
    pub(crate) fn record_float(&mut self, row: usize, v: f64) -> bool {
        match Special::classify(v) {
            Some(special) => {
                self.entities.record(special, row);
                true
            }
            None => false,
        }
    }

    pub(crate) fn record_nanos(&mut self, row: usize, nanos: i64) {
        if nanos != 0 {
            self.nanos[row] = nanos;
            self.has_nanos = true;
        }
    }

    pub(crate) fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn has_nanos(&self) -> bool {
        self.has_nanos
    }
}

/// Writes the `entities` and `nanos` keys, omitting each when unused.
pub(crate) fn write_side_channels(w: &mut JsonWriter<'_>, columns: &[ColumnSidecar]) -> FrameResult<()> {
    if columns.iter().any(|c| !c.entities.is_empty()) {
        w.key("entities")?;
        w.begin_array();
        for column in columns {
            if column.entities.is_empty() {
                w.null();
            } else {
                w.value(&column.entities)?;
            }
        }
        w.end_array();
    }
    if columns.iter().any(ColumnSidecar::has_nanos) {
        w.key("nanos")?;
        w.begin_array();
        for column in columns {
            if column.has_nanos {
                w.value(&column.nanos)?;
            } else {
                w.null();
            }
        }
        w.end_array();
    }
    Ok(())
}

// ── Reading ────────────────────────────────────────────────────────

/// Side-channel lookups for one column being read.
#[derive(Debug, Default)]
pub(crate) struct ColumnSideIn<'a> {
    entities: HashMap<usize, Special>,
    nanos: Option<&'a [i64]>,
}

impl<'a> ColumnSideIn<'a> {
    /// Builds the lookups for field `field_idx` holding `rows` values.
    pub(crate) fn new(
        field_idx: usize,
        rows: usize,
        entities: Option<EntityLookup>,
        nanos: Option<&'a [i64]>,
    ) -> FrameResult<Self> {
        if let Some(nanos) = nanos {
            if nanos.len() != rows {
                return Err(FrameError::malformed(format!(
                    "nanos for field {field_idx} has {} entries but the field has {rows} values",
                    nanos.len()
                )));
            }
            if let Some(row) = nanos.iter().position(|n| !(0..NANOS_PER_MILLI).contains(n)) {
                return Err(FrameError::malformed(format!(
                    "nanos {} at row {row} of field {field_idx} is outside 0..{NANOS_PER_MILLI}",
                    nanos[row]
                )));
            }
        }
        let entities = match entities {
            Some(lookup) => lookup.into_rows(field_idx, rows)?,
            None => HashMap::new(),
        };
        Ok(Self { entities, nanos })
    }

    pub(crate) fn special(&self, row: usize) -> Option<Special> {
        self.entities.get(&row).copied()
    }

    pub(crate) fn nanos(&self, row: usize) -> i64 {
        self.nanos.map_or(0, |n| n[row])
    }
}
