//! Lazy column layout for estimation datasets.
//!
//! Models don't declare up front which `(alternative, coefficient)` pairs
//! their utility expressions touch — conditional terms appear only for the
//! units they apply to.  The layout therefore hands out term columns on
//! first use, in encounter order, and the dataset is only rectangular once
//! the last observation has been recorded.  Earlier rows are padded with
//! zeros at flush, which is exact: an absent term is a zero covariate.

use dcm_logit::Observation;
use rustc_hash::FxHashMap;

use crate::row::ObservationRow;

/// Column positions for one model's estimation dataset.
///
/// Fixed leading columns (`unit`, `observed`, one availability flag per
/// alternative) are followed by one term column per `(alternative,
/// coefficient)` pair ever touched, labeled `u{alt}_c{coeff}`.
#[derive(Debug)]
pub struct ObservationLayout {
    total_alternatives: usize,
    /// Term columns in first-use order.
    columns:            Vec<(usize, usize)>,
    positions:          FxHashMap<(usize, usize), usize>,
}

impl ObservationLayout {
    pub fn new(total_alternatives: usize) -> Self {
        Self {
            total_alternatives,
            columns: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Term column for `(alternative, coefficient)`, assigning the next
    /// free position on first use.
    fn position(&mut self, alternative: usize, coefficient: usize) -> usize {
        *self.positions.entry((alternative, coefficient)).or_insert_with(|| {
            self.columns.push((alternative, coefficient));
            self.columns.len() - 1
        })
    }

    /// Flatten one observation into a row under this layout, growing the
    /// layout as new term columns appear.
    pub fn row(&mut self, observation: &Observation) -> ObservationRow {
        let availability =
            observation.alternatives.iter().map(|a| a.available).collect();
        let mut values = vec![0.0; self.term_width()];
        for alternative in &observation.alternatives {
            for &(coefficient, value) in &alternative.terms {
                let position = self.position(alternative.index, coefficient);
                if position >= values.len() {
                    values.resize(position + 1, 0.0);
                }
                values[position] = value;
            }
        }
        ObservationRow {
            unit: observation.unit,
            observed: observation.observed,
            availability,
            values,
        }
    }

    /// Zero-fill a row out to the current term width.
    pub fn pad(&self, row: &mut ObservationRow) {
        row.values.resize(self.term_width(), 0.0);
    }

    #[inline]
    pub fn total_alternatives(&self) -> usize {
        self.total_alternatives
    }

    /// Number of term columns assigned so far.
    #[inline]
    pub fn term_width(&self) -> usize {
        self.columns.len()
    }

    /// Total column count, fixed leading columns included.
    #[inline]
    pub fn width(&self) -> usize {
        2 + self.total_alternatives + self.term_width()
    }

    /// Assigned term columns as `(alternative, coefficient)` pairs, in
    /// column order.
    #[inline]
    pub fn term_columns(&self) -> &[(usize, usize)] {
        &self.columns
    }

    /// Header labels for every column, in column order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.width());
        headers.push("unit".to_owned());
        headers.push("observed".to_owned());
        for alternative in 0..self.total_alternatives {
            headers.push(format!("avail{alternative}"));
        }
        for &(alternative, coefficient) in &self.columns {
            headers.push(format!("u{alternative}_c{coefficient}"));
        }
        headers
    }
}
