//! Per-cell fields: raw values, normalized scores and composites.
//!
//! A field build samples a [`crate::model::FieldModel`] at every centroid of a
//! [`crate::tiling::TiledRegion`] ([`RawField`]), then the [`Normalizer`] rescales the
//! raw values to [0, 1] with seeded jitter ([`ScoredField`]). Two scored fields over the
//! same cell set can be merged by [`combine`] into a [`CombinedField`].
//!
//! Every output is ordered by cell identifier.
use h3o::Resolution;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tiling::{Cell, CellId, GeoPoint};

pub mod builder;
pub mod combine;
pub mod config;
pub mod events;
pub mod normalize;
pub mod ranking;

pub use builder::{
    build_gradient_field, build_model_field, build_model_field_with_events, build_raw_field,
    build_scored_field, FieldBuilder,
};
pub use combine::{build_combined_field, combine, CombineOp};
pub use config::{parse_resolution, FieldConfig};
pub use events::{EventSink, FieldEvent, FieldEventKind, FnSink, MultiSink, VecSink};
pub use normalize::{clamp01, normalize, DegeneratePolicy, Normalizer};

/// Linear mapping from a score to a domain unit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayScale {
    /// `round(score * scale_max)`, e.g. an energy surplus in MW.
    Magnitude { scale_max: f64 },
    /// `round(min_unit + score * (max_unit - min_unit))`, e.g. a temperature.
    Bounded { min_unit: f64, max_unit: f64 },
}

impl Default for DisplayScale {
    fn default() -> Self {
        DisplayScale::Magnitude { scale_max: 100.0 }
    }
}

impl DisplayScale {
    pub fn validate(&self) -> Result<()> {
        match *self {
            DisplayScale::Magnitude { scale_max } => {
                if !scale_max.is_finite() || scale_max <= 0.0 {
                    return Err(Error::InvalidConfig(
                        "display scale_max must be finite and > 0".into(),
                    ));
                }
            }
            DisplayScale::Bounded { min_unit, max_unit } => {
                if !min_unit.is_finite() || !max_unit.is_finite() || max_unit <= min_unit {
                    return Err(Error::InvalidConfig(
                        "display bounds must be finite with max_unit > min_unit".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Display value for a score in [0, 1].
    #[inline]
    pub fn display_value(&self, score: f64) -> i64 {
        let v = match *self {
            DisplayScale::Magnitude { scale_max } => score * scale_max,
            DisplayScale::Bounded { min_unit, max_unit } => {
                min_unit + score * (max_unit - min_unit)
            }
        };
        v.round() as i64
    }
}

/// Unnormalized model output per cell, in cell-id order.
#[derive(Clone, Debug)]
pub struct RawField {
    pub resolution: Resolution,
    pub cells: Vec<Cell>,
    pub values: Vec<f64>,
}

impl RawField {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest value, or `None` for an empty field.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        min_max(&self.values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Cell, f64)> + '_ {
        self.cells.iter().zip(self.values.iter().copied())
    }
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// `(v - min) / (max - min)` on halved operands, so finite extremes never overflow.
#[inline]
pub(crate) fn unit_position(v: f64, min: f64, max: f64) -> f64 {
    (v * 0.5 - min * 0.5) / (max * 0.5 - min * 0.5)
}

/// One cell of a [`ScoredField`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredCell {
    pub id: CellId,
    pub centroid: GeoPoint,
    /// Model output before normalization.
    pub raw: f64,
    /// Normalized score in [0, 1].
    pub score: f64,
    pub display_value: i64,
}

/// A normalized field over a tiled region.
#[derive(Clone, Debug)]
pub struct ScoredField {
    pub label: String,
    pub resolution: Resolution,
    pub display: DisplayScale,
    /// `true` when the raw field was flat and every base score was set to zero.
    pub degenerate: bool,
    pub cells: Vec<ScoredCell>,
}

impl ScoredField {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredCell> {
        self.cells.iter()
    }

    /// Looks up a cell by identifier.
    pub fn get(&self, id: CellId) -> Option<&ScoredCell> {
        self.cells
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.cells[i])
    }

    pub fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().map(|c| c.id)
    }

    pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().map(|c| c.score)
    }

    /// Mean score, or `0.0` for an empty field.
    pub fn mean_score(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.scores().sum::<f64>() / self.cells.len() as f64
    }
}

/// One cell of a [`CombinedField`], carrying the display values of both inputs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombinedCell {
    pub id: CellId,
    pub centroid: GeoPoint,
    /// Combiner output before the second normalization pass.
    pub raw: f64,
    pub score: f64,
    pub display_value_a: i64,
    pub display_value_b: i64,
}

/// Result of merging two scored fields cell by cell.
#[derive(Clone, Debug)]
pub struct CombinedField {
    pub label: String,
    pub resolution: Resolution,
    pub op: CombineOp,
    pub degenerate: bool,
    pub cells: Vec<CombinedCell>,
}

impl CombinedField {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CombinedCell> {
        self.cells.iter()
    }

    pub fn get(&self, id: CellId) -> Option<&CombinedCell> {
        self.cells
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &self.cells[i])
    }
}
