//! Ranking helpers for picking the best cells of a field.
//!
//! - [`ScoredField::top_n`] and [`CombinedField::top_n`]: the `n` highest scores.
//! - [`ScoredField::best`] and [`CombinedField::best`]: the single highest score.
//!
//! Ties are broken by ascending cell identifier, so rankings are deterministic.
use std::cmp::Ordering;

use crate::field::{CombinedCell, CombinedField, ScoredCell, ScoredField};
use crate::tiling::CellId;

fn by_rank(a: (f64, CellId), b: (f64, CellId)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1))
}

fn top_n_by<T>(items: &[T], n: usize, key: impl Fn(&T) -> (f64, CellId)) -> Vec<&T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by(|a, b| by_rank(key(a), key(b)));
    ranked.truncate(n);
    ranked
}

impl ScoredField {
    /// The `n` highest-scoring cells, best first.
    pub fn top_n(&self, n: usize) -> Vec<&ScoredCell> {
        top_n_by(&self.cells, n, |c| (c.score, c.id))
    }

    pub fn best(&self) -> Option<&ScoredCell> {
        self.cells
            .iter()
            .min_by(|a, b| by_rank((a.score, a.id), (b.score, b.id)))
    }
}

impl CombinedField {
    /// The `n` highest-scoring cells, best first.
    pub fn top_n(&self, n: usize) -> Vec<&CombinedCell> {
        top_n_by(&self.cells, n, |c| (c.score, c.id))
    }

    pub fn best(&self) -> Option<&CombinedCell> {
        self.cells
            .iter()
            .min_by(|a, b| by_rank((a.score, a.id), (b.score, b.id)))
    }
}
