//! Cell-wise combination of two scored fields.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::field::normalize::clamp01;
use crate::field::{min_max, unit_position, CombinedCell, CombinedField, ScoredField};

/// Elementwise formula applied to the scores `a` and `b` of one cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CombineOp {
    /// `a * (1 - b)`: high `a` and low `b` is best.
    #[default]
    Suitability,
    /// `a * b`.
    Product,
    /// `weight_a * a + weight_b * b`.
    WeightedSum { weight_a: f64, weight_b: f64 },
}

impl CombineOp {
    #[inline]
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match *self {
            CombineOp::Suitability => a * (1.0 - b),
            CombineOp::Product => a * b,
            CombineOp::WeightedSum { weight_a, weight_b } => weight_a * a + weight_b * b,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CombineOp::Suitability => "suitability",
            CombineOp::Product => "product",
            CombineOp::WeightedSum { .. } => "weighted-sum",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let CombineOp::WeightedSum { weight_a, weight_b } = *self {
            if !weight_a.is_finite() || !weight_b.is_finite() {
                return Err(Error::InvalidConfig(
                    "weighted-sum weights must be finite".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Combines `a` and `b` cell by cell with `op`, then min-max normalizes the result.
///
/// Both fields must cover the identical cell set at the same resolution. No jitter is
/// added; a flat result yields all-zero scores and `degenerate = true`. A combination
/// that overflows fails with [`Error::NonFinite`].
pub fn combine(a: &ScoredField, b: &ScoredField, op: CombineOp) -> Result<CombinedField> {
    op.validate()?;
    if a.resolution != b.resolution || !a.ids().eq(b.ids()) {
        return Err(Error::CellSetMismatch {
            left: a.len(),
            right: b.len(),
            shared: shared_cells(a, b),
        });
    }

    let raw: Vec<f64> = a
        .iter()
        .zip(b.iter())
        .map(|(ca, cb)| op.apply(ca.score, cb.score))
        .collect();

    if let Some((cell, _)) = a.iter().zip(&raw).find(|(_, r)| !r.is_finite()) {
        return Err(Error::NonFinite { cell: cell.id });
    }

    let label = format!("{} ({} / {})", op.name(), a.label, b.label);
    let (min, max) = min_max(&raw).ok_or(Error::EmptyTiling {
        resolution: u8::from(a.resolution),
    })?;
    let degenerate = max == min;
    if degenerate {
        warn!("Combined field '{}' is flat at {}; scores set to zero.", label, min);
    }

    let cells: Vec<CombinedCell> = a
        .iter()
        .zip(b.iter())
        .zip(raw)
        .map(|((ca, cb), r)| CombinedCell {
            id: ca.id,
            centroid: ca.centroid,
            raw: r,
            score: if degenerate {
                0.0
            } else {
                clamp01(unit_position(r, min, max))
            },
            display_value_a: ca.display_value,
            display_value_b: cb.display_value,
        })
        .collect();

    info!("Combined field '{}' built: {} cells.", label, cells.len());

    Ok(CombinedField {
        label,
        resolution: a.resolution,
        op,
        degenerate,
        cells,
    })
}

/// Site-suitability composite: `a * (1 - b)`, renormalized.
pub fn build_combined_field(a: &ScoredField, b: &ScoredField) -> Result<CombinedField> {
    combine(a, b, CombineOp::Suitability)
}

fn shared_cells(a: &ScoredField, b: &ScoredField) -> usize {
    if a.resolution != b.resolution {
        return 0;
    }
    let (mut i, mut j, mut n) = (0, 0, 0);
    while i < a.cells.len() && j < b.cells.len() {
        match a.cells[i].id.cmp(&b.cells[j].id) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                n += 1;
                i += 1;
                j += 1;
            }
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use h3o::Resolution;

    use super::*;
    use crate::field::normalize::tests::raw_field;
    use crate::field::{DisplayScale, ScoredCell};

    fn scored(label: &str, scores: &[f64]) -> ScoredField {
        let raw = raw_field(scores);
        let display = DisplayScale::Magnitude { scale_max: 10.0 };
        ScoredField {
            label: label.into(),
            resolution: raw.resolution,
            display,
            degenerate: false,
            cells: raw
                .iter()
                .map(|(cell, s)| ScoredCell {
                    id: cell.id,
                    centroid: cell.centroid,
                    raw: s,
                    score: s,
                    display_value: display.display_value(s),
                })
                .collect(),
        }
    }

    #[test]
    fn suitability_uses_exact_formula() {
        let a = scored("surplus", &[0.2, 0.9, 0.5, 1.0]);
        let b = scored("temperature", &[0.5, 0.1, 0.0, 1.0]);
        let c = build_combined_field(&a, &b).unwrap();
        let expected = [0.1, 0.81, 0.5, 0.0];
        for (cell, e) in c.iter().zip(expected) {
            assert_relative_eq!(cell.raw, e, epsilon = 1e-12);
            assert_relative_eq!(cell.score, e / 0.81, epsilon = 1e-12);
        }
        assert_eq!(c.op, CombineOp::Suitability);
        assert!(!c.degenerate);
    }

    #[test]
    fn combine_is_asymmetric_in_value() {
        let a = scored("a", &[0.2, 0.9, 0.5]);
        let b = scored("b", &[0.7, 0.1, 0.4]);
        let ab = build_combined_field(&a, &b).unwrap();
        let ba = build_combined_field(&b, &a).unwrap();
        assert!(ab.iter().map(|c| c.id).eq(ba.iter().map(|c| c.id)));
        assert!(ab.iter().zip(ba.iter()).any(|(x, y)| x.raw != y.raw));
    }

    #[test]
    fn display_values_of_both_inputs_are_carried() {
        let a = scored("a", &[0.2, 0.9]);
        let b = scored("b", &[0.7, 0.1]);
        let c = combine(&a, &b, CombineOp::Product).unwrap();
        let pairs: Vec<_> = c
            .iter()
            .map(|cell| (cell.display_value_a, cell.display_value_b))
            .collect();
        assert_eq!(pairs, vec![(2, 7), (9, 1)]);
    }

    #[test]
    fn weighted_sum_blends_scores() {
        let op = CombineOp::WeightedSum {
            weight_a: 0.55,
            weight_b: 0.45,
        };
        assert_relative_eq!(op.apply(1.0, 0.0), 0.55);
        assert_relative_eq!(op.apply(0.5, 0.5), 0.5);
        assert!(CombineOp::WeightedSum {
            weight_a: f64::NAN,
            weight_b: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn huge_weights_do_not_produce_nan_scores() {
        let a = scored("a", &[0.0, 1.0, 0.5]);
        let b = scored("b", &[1.0, 0.0, 0.5]);
        let op = CombineOp::WeightedSum {
            weight_a: 1e308,
            weight_b: -1e308,
        };
        let c = combine(&a, &b, op).unwrap();
        let scores: Vec<f64> = c.iter().map(|cell| cell.score).collect();
        assert_eq!(scores, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn overflowing_combination_is_rejected() {
        let a = scored("a", &[0.2, 1.0]);
        let b = scored("b", &[0.3, 1.0]);
        let op = CombineOp::WeightedSum {
            weight_a: 1e308,
            weight_b: 1e308,
        };
        let err = combine(&a, &b, op).unwrap_err();
        assert!(matches!(err, Error::NonFinite { cell } if cell == a.cells[1].id));
    }

    #[test]
    fn mismatched_cell_sets_are_rejected() {
        let a = scored("a", &[0.1, 0.2, 0.3]);
        let mut b = scored("b", &[0.1, 0.2, 0.3]);
        b.cells.pop();
        let err = build_combined_field(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            Error::CellSetMismatch {
                left: 3,
                right: 2,
                shared: 2
            }
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn different_resolutions_are_rejected() {
        let a = scored("a", &[0.1, 0.2]);
        let mut b = a.clone();
        b.resolution = Resolution::Eight;
        let err = build_combined_field(&a, &b).unwrap_err();
        assert!(matches!(err, Error::CellSetMismatch { shared: 0, .. }));
    }

    #[test]
    fn flat_combination_is_all_zero() {
        let a = scored("a", &[0.5, 0.5, 0.5]);
        let b = scored("b", &[0.5, 0.5, 0.5]);
        let c = build_combined_field(&a, &b).unwrap();
        assert!(c.degenerate);
        assert!(c.iter().all(|cell| cell.score == 0.0));
    }

    #[test]
    fn combined_scores_span_unit_interval() {
        let a = scored("a", &[0.3, 0.6, 0.9, 0.1]);
        let b = scored("b", &[0.2, 0.8, 0.4, 0.6]);
        let c = build_combined_field(&a, &b).unwrap();
        let scores: Vec<f64> = c.iter().map(|cell| cell.score).collect();
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores.contains(&0.0));
        assert!(scores.contains(&1.0));
    }
}
