//! Error types for dcm-logit.

use dcm_core::UnitId;
use thiserror::Error;

/// Errors raised while building or consuming a choice calculator.
///
/// Construction-time problems (bad indexes, non-finite terms, conflicting
/// re-marks) are recorded as a sticky fault on the calculator and surface
/// here when it is consumed, so model code can stay free of `?` chains in
/// its utility expressions.  Every variant names the model, and variants
/// tied to a decision carry the unit, so a failure deep in a batch run can
/// be traced to one entity.
#[derive(Debug, Error)]
pub enum LogitError {
    /// Every alternative in the set was unavailable when it was solved.
    #[error("model {model}: no available alternative for unit {unit}")]
    NoAvailableAlternative { model: String, unit: UnitId },

    /// A utility term evaluated to NaN or an infinity.
    #[error(
        "model {model}: non-finite utility term {value} for alternative {alternative}, coefficient {coefficient}"
    )]
    NonFiniteUtility {
        model:       String,
        alternative: usize,
        coefficient: usize,
        value:       f64,
    },

    /// An alternative was re-marked with conflicting availability or
    /// observed flags, or given conflicting nest placements.
    #[error("model {model}: conflicting definition of alternative {alternative}")]
    InconsistentAlternative { model: String, alternative: usize },

    /// A nest's dissimilarity resolved outside the open-closed range (0, 1].
    #[error("model {model}: nest {nest} dissimilarity {value} outside (0, 1]")]
    InvalidDissimilarity { model: String, nest: usize, value: f64 },

    /// A structural problem: bad dimensions, an out-of-range index, or a
    /// calculator consumed in the wrong mode.
    #[error("model {model}: {message}")]
    Configuration { model: String, message: String },
}

pub type LogitResult<T> = Result<T, LogitError>;
