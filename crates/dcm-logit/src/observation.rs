//! Estimation-export observation records.

use dcm_core::UnitId;

/// One exported decision: the observed choice plus everything the external
/// estimation package needs to rebuild the likelihood.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub model:        String,
    pub unit:         UnitId,
    /// Index of the alternative the unit was observed to choose.
    pub observed:     usize,
    /// Every alternative the model defines, in index order.
    pub alternatives: Vec<ObservationAlternative>,
}

/// Per-alternative slice of an observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservationAlternative {
    pub index:     usize,
    pub available: bool,
    /// Nest membership, when the model nests this alternative.
    pub nest:      Option<usize>,
    /// Raw `(coefficient, value)` covariates in first-touch order.  Zeros
    /// are kept and repeated slots arrive pre-summed.
    pub terms:     Vec<(usize, f64)>,
}

impl Observation {
    /// Look up the covariates recorded for one alternative.
    pub fn terms(&self, alternative: usize) -> Option<&[(usize, f64)]> {
        self.alternatives.get(alternative).map(|a| a.terms.as_slice())
    }
}
