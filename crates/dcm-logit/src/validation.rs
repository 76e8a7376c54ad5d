//! Per-unit validation record.

use dcm_core::UnitId;

/// How one solved choice set treated the observed ground truth.
///
/// Produced by [`ChoiceCalculator::simulate_validated`] when an estimated
/// model is re-run in application mode over its own estimation data.
///
/// [`ChoiceCalculator::simulate_validated`]: crate::calculator::ChoiceCalculator::simulate_validated
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validation {
    pub unit:                 UnitId,
    /// Alternative index the unit actually chose.
    pub observed:             usize,
    /// Whether the model made the observed choice available.
    pub observed_available:   bool,
    /// Unconditional probability the model assigned to the observed choice.
    pub observed_probability: f64,
    /// Alternative index the simulation picked.
    pub predicted:            usize,
    pub probabilities:        Vec<f64>,
    pub availability:         Vec<bool>,
}

impl Validation {
    /// True when the simulated choice reproduced the observed one.
    #[inline]
    pub fn matched(&self) -> bool {
        self.predicted == self.observed
    }
}
