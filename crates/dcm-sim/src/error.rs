//! Error types for dcm-sim.

use dcm_core::UnitId;
use dcm_logit::LogitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("run configuration error: {0}")]
    Config(String),

    /// A decision faulted.  Carries the unit and model so a failure deep in
    /// a batch can be traced to one entity.
    #[error("model {model}, unit {unit}: {source}")]
    Unit {
        unit:  UnitId,
        model: String,
        #[source]
        source: LogitError,
    },
}

pub type SimResult<T> = Result<T, SimError>;
