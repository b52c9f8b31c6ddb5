//! Min-max normalization with seeded jitter.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::field::{unit_position, DisplayScale, RawField, ScoredCell, ScoredField};
use crate::sequence::SeededSequence;

/// What to do when every raw value is equal and `(raw - min) / range` is undefined.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Use a base score of zero for every cell. Jitter is still drawn and applied, and
    /// the field is flagged as degenerate.
    #[default]
    Zero,
    /// Fail with [`Error::DegenerateField`].
    Reject,
}

#[inline]
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Rescales raw fields into [0, 1] scores.
///
/// For each cell in cell-id order one value `r` is drawn from the sequence and
/// `score = clamp01((raw - min) / (max - min) + (r - 0.5) * jitter_amplitude)`.
/// Raw values must be finite; the first non-finite one fails with [`Error::NonFinite`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalizer {
    pub jitter_amplitude: f64,
    pub policy: DegeneratePolicy,
    pub display: DisplayScale,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            jitter_amplitude: 0.05,
            policy: DegeneratePolicy::Zero,
            display: DisplayScale::default(),
        }
    }
}

impl Normalizer {
    pub fn new(jitter_amplitude: f64) -> Self {
        Self {
            jitter_amplitude,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_display(mut self, display: DisplayScale) -> Self {
        self.display = display;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.jitter_amplitude.is_finite() || self.jitter_amplitude < 0.0 {
            return Err(Error::InvalidConfig(
                "jitter_amplitude must be finite and >= 0".into(),
            ));
        }
        self.display.validate()
    }

    /// Normalizes `raw`, drawing one jitter value per cell from `seq`.
    ///
    /// The returned field has an empty label; builders fill it in.
    pub fn normalize(&self, raw: &RawField, seq: &mut SeededSequence) -> Result<ScoredField> {
        self.validate()?;
        if raw.cells.len() != raw.values.len() {
            return Err(Error::Other(format!(
                "raw field has {} cells but {} values",
                raw.cells.len(),
                raw.values.len()
            )));
        }

        if let Some((cell, _)) = raw.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::NonFinite { cell: cell.id });
        }
        let Some((min, max)) = raw.min_max() else {
            return Err(Error::EmptyTiling {
                resolution: u8::from(raw.resolution),
            });
        };
        let degenerate = max == min;
        if degenerate {
            warn!(
                "Raw field is flat at {} over {} cells; policy {:?}.",
                min,
                raw.len(),
                self.policy
            );
            if self.policy == DegeneratePolicy::Reject {
                return Err(Error::DegenerateField { value: min });
            }
        }

        let cells = raw
            .iter()
            .map(|(cell, value)| {
                let base = if degenerate {
                    0.0
                } else {
                    unit_position(value, min, max)
                };
                let r = seq.next_unit();
                let score = clamp01(base + (r - 0.5) * self.jitter_amplitude);
                ScoredCell {
                    id: cell.id,
                    centroid: cell.centroid,
                    raw: value,
                    score,
                    display_value: self.display.display_value(score),
                }
            })
            .collect();

        Ok(ScoredField {
            label: String::new(),
            resolution: raw.resolution,
            display: self.display,
            degenerate,
            cells,
        })
    }
}

/// Normalizes `raw` with a fresh sequence started at `seed`, the default display scale
/// and the [`DegeneratePolicy::Zero`] policy.
pub fn normalize(raw: &RawField, seed: u32, jitter_amplitude: f64) -> Result<ScoredField> {
    let mut seq = SeededSequence::new(seed);
    Normalizer::new(jitter_amplitude).normalize(raw, &mut seq)
}

#[cfg(test)]
pub(crate) mod tests {
    use approx::assert_relative_eq;
    use h3o::{LatLng, Resolution};

    use super::*;
    use crate::tiling::{Cell, GeoPoint};

    /// Raw field over real cells near Dallas with the given values.
    pub(crate) fn raw_field(values: &[f64]) -> RawField {
        let res = Resolution::Seven;
        let mut ids: Vec<_> = (0..values.len())
            .map(|i| {
                LatLng::new(32.0 + i as f64 * 0.05, -97.0)
                    .unwrap()
                    .to_cell(res)
            })
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), values.len());
        let cells = ids
            .into_iter()
            .map(|id| {
                let ll = LatLng::from(id);
                Cell {
                    id,
                    centroid: GeoPoint::new(ll.lat(), ll.lng()),
                }
            })
            .collect();
        RawField {
            resolution: res,
            cells,
            values: values.to_vec(),
        }
    }

    #[test]
    fn scores_without_jitter_are_min_max_scaled() {
        let raw = raw_field(&[2.0, 4.0, 6.0]);
        let field = normalize(&raw, 7, 0.0).unwrap();
        let scores: Vec<f64> = field.scores().collect();
        assert_relative_eq!(scores[0], 0.0);
        assert_relative_eq!(scores[1], 0.5);
        assert_relative_eq!(scores[2], 1.0);
        assert!(!field.degenerate);
    }

    #[test]
    fn jitter_follows_the_sequence_in_cell_order() {
        let raw = raw_field(&[0.0, 1.0, 3.0, 4.0]);
        let amp = 0.1;
        let field = normalize(&raw, 99, amp).unwrap();
        let mut seq = SeededSequence::new(99);
        for (cell, &v) in field.iter().zip(raw.values.iter()) {
            let expected = clamp01(v / 4.0 + (seq.next_unit() - 0.5) * amp);
            assert_eq!(cell.score, expected);
            assert_eq!(cell.raw, v);
        }
    }

    #[test]
    fn scores_stay_in_unit_interval_with_large_jitter() {
        let raw = raw_field(&[-5.0, 0.0, 0.1, 9.0, 12.0]);
        let field = normalize(&raw, 3, 2.0).unwrap();
        assert!(field.scores().all(|s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn normalization_is_reproducible() {
        let raw = raw_field(&[0.3, -1.2, 4.4, 2.0]);
        let a = normalize(&raw, 42, 0.05).unwrap();
        let b = normalize(&raw, 42, 0.05).unwrap();
        let bits = |f: &ScoredField| f.scores().map(f64::to_bits).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        let c = normalize(&raw, 43, 0.05).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn flat_field_scores_zero_plus_jitter() {
        let raw = raw_field(&[1.5, 1.5, 1.5]);
        let no_jitter = normalize(&raw, 1, 0.0).unwrap();
        assert!(no_jitter.degenerate);
        assert!(no_jitter.scores().all(|s| s == 0.0));

        let jittered = normalize(&raw, 1, 0.5).unwrap();
        let mut seq = SeededSequence::new(1);
        for cell in jittered.iter() {
            assert_eq!(cell.score, clamp01((seq.next_unit() - 0.5) * 0.5));
            assert!(cell.score.is_finite());
        }
    }

    #[test]
    fn flat_field_can_be_rejected() {
        let raw = raw_field(&[2.0, 2.0]);
        let mut seq = SeededSequence::new(1);
        let err = Normalizer::new(0.05)
            .with_policy(DegeneratePolicy::Reject)
            .normalize(&raw, &mut seq)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateField { value } if value == 2.0));
        assert!(!err.is_configuration());
    }

    #[test]
    fn display_values_follow_scores() {
        let raw = raw_field(&[0.0, 10.0]);
        let mut seq = SeededSequence::new(5);
        let field = Normalizer::new(0.0)
            .with_display(DisplayScale::Bounded {
                min_unit: 55.0,
                max_unit: 75.0,
            })
            .normalize(&raw, &mut seq)
            .unwrap();
        let shown: Vec<i64> = field.iter().map(|c| c.display_value).collect();
        assert_eq!(shown, vec![55, 75]);
    }

    #[test]
    fn extreme_finite_range_does_not_overflow() {
        let raw = raw_field(&[1e308, -1e308, 0.0]);
        let field = normalize(&raw, 11, 0.0).unwrap();
        let scores: Vec<f64> = field.scores().collect();
        assert_eq!(scores, vec![1.0, 0.0, 0.5]);
        let jittered = normalize(&raw, 11, 0.3).unwrap();
        assert!(jittered.scores().all(|s| (0.0..=1.0).contains(&s)));
    }

    #[test]
    fn non_finite_raw_values_are_rejected() {
        let raw = raw_field(&[0.0, f64::NAN, 1.0]);
        let err = normalize(&raw, 0, 0.05).unwrap_err();
        assert!(matches!(err, Error::NonFinite { cell } if cell == raw.cells[1].id));

        let raw = raw_field(&[f64::INFINITY, 0.0]);
        assert!(matches!(
            normalize(&raw, 0, 0.05),
            Err(Error::NonFinite { .. })
        ));
    }

    #[test]
    fn negative_jitter_is_rejected() {
        let raw = raw_field(&[0.0, 1.0]);
        let err = normalize(&raw, 0, -0.1).unwrap_err();
        assert!(err.is_configuration());
    }
}
