//! Plain data row type written by observation sinks.

use dcm_core::UnitId;

/// One estimation-dataset row: a surveyed decision flattened into the
/// model's column layout.
///
/// `values` is indexed by term column and may be shorter than the final
/// layout while recording is still in progress; the recorder pads every
/// row with zeros once the last observation has fixed the column count.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub unit:         UnitId,
    /// Index of the alternative the unit was observed to choose.
    pub observed:     usize,
    /// Availability flag per alternative, in index order.
    pub availability: Vec<bool>,
    /// Raw covariate values in term-column order.
    pub values:       Vec<f64>,
}
